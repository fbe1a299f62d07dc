//! Console configuration loaded via OrthoConfig.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No backend URL was configured.
    #[error("backend base URL is not configured; set CRM_CONSOLE_BASE_URL")]
    MissingBaseUrl,
    /// The configured backend URL does not parse.
    #[error("backend base URL {value:?} is invalid: {message}")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
}

/// Settings for reaching the CRM backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM_CONSOLE")]
pub struct ConsoleSettings {
    /// Backend base URL; every endpoint path is resolved below it.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds; zero falls back to the default.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Rows per listing page.
    pub page_size: Option<u32>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl ConsoleSettings {
    /// Parsed backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the URL is missing, blank or invalid.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SettingsError::MissingBaseUrl)?;
        Url::parse(raw).map_err(|error| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            message: error.to_string(),
        })
    }

    /// Request timeout, defaulting to 30 seconds.
    pub fn request_timeout(&self) -> Duration {
        let secs = if self.request_timeout_secs == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            self.request_timeout_secs
        };
        Duration::from_secs(secs)
    }

    /// Rows per listing page, defaulting to 10.
    pub fn page_size(&self) -> u32 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Loader arguments for `program`, forwarding a command-line base URL.
///
/// The URL travels through the loader's own CLI layer so it takes precedence
/// over the environment and any config file.
pub fn loader_args(program: &str, base_url: Option<&str>) -> Vec<OsString> {
    let mut args = vec![OsString::from(program)];
    if let Some(url) = base_url {
        args.push(OsString::from("--base-url"));
        args.push(OsString::from(url));
    }
    args
}

#[cfg(test)]
mod tests {
    //! Unit tests for console configuration parsing.

    use super::*;

    use env_lock::lock_env;
    use rstest::rstest;

    fn empty() -> ConsoleSettings {
        ConsoleSettings {
            base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: None,
            user_agent: None,
        }
    }

    fn load_from_empty_args() -> ConsoleSettings {
        ConsoleSettings::load_from_iter(loader_args("crm-console", None))
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("CRM_CONSOLE_BASE_URL", None::<String>),
            ("CRM_CONSOLE_REQUEST_TIMEOUT_SECS", None::<String>),
            ("CRM_CONSOLE_PAGE_SIZE", None::<String>),
            ("CRM_CONSOLE_USER_AGENT", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.base_url(), Err(SettingsError::MissingBaseUrl));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.page_size(), 10);
        assert!(settings.user_agent.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "CRM_CONSOLE_BASE_URL",
                Some("https://crm.invalid/api".to_owned()),
            ),
            ("CRM_CONSOLE_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
            ("CRM_CONSOLE_PAGE_SIZE", Some("25".to_owned())),
            ("CRM_CONSOLE_USER_AGENT", Some("ops-script/1".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().map(String::from),
            Ok("https://crm.invalid/api".to_owned())
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        assert_eq!(settings.page_size(), 25);
        assert_eq!(settings.user_agent.as_deref(), Some("ops-script/1"));
    }

    #[rstest]
    fn command_line_base_url_wins_over_the_environment() {
        let _guard = lock_env([
            (
                "CRM_CONSOLE_BASE_URL",
                Some("https://env.invalid/api".to_owned()),
            ),
            ("CRM_CONSOLE_REQUEST_TIMEOUT_SECS", None::<String>),
            ("CRM_CONSOLE_PAGE_SIZE", None::<String>),
            ("CRM_CONSOLE_USER_AGENT", None::<String>),
        ]);

        let settings = ConsoleSettings::load_from_iter(loader_args(
            "crm-console",
            Some("https://cli.invalid/api"),
        ))
        .expect("config should load");

        assert_eq!(
            settings.base_url().map(String::from),
            Ok("https://cli.invalid/api".to_owned())
        );
    }

    #[rstest]
    fn command_line_base_url_is_used_without_environment() {
        let _guard = lock_env([
            ("CRM_CONSOLE_BASE_URL", None::<String>),
            ("CRM_CONSOLE_REQUEST_TIMEOUT_SECS", None::<String>),
            ("CRM_CONSOLE_PAGE_SIZE", None::<String>),
            ("CRM_CONSOLE_USER_AGENT", None::<String>),
        ]);

        let settings = ConsoleSettings::load_from_iter(loader_args(
            "crm-console",
            Some("http://127.0.0.1:9"),
        ))
        .expect("config should load");

        assert!(settings.base_url().is_ok());
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[rstest]
    #[case::blank("  ")]
    #[case::relative("crm/api")]
    fn unusable_base_urls_are_reported(#[case] raw: &str) {
        let settings = ConsoleSettings {
            base_url: Some(raw.to_owned()),
            ..empty()
        };
        assert!(settings.base_url().is_err());
    }

    #[rstest]
    fn zero_values_fall_back_to_defaults() {
        let settings = ConsoleSettings {
            request_timeout_secs: 0,
            page_size: Some(0),
            ..empty()
        };
        assert_eq!(
            settings.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        assert_eq!(settings.page_size(), DEFAULT_PAGE_SIZE);
    }
}
