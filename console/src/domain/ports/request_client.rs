//! Driven port for the generic JSON request client.
//!
//! Every backend call goes through this port: paths are relative to the
//! configured base URL, bodies are JSON, and any non-2xx status becomes a
//! [`RequestError::Status`] carrying the HTTP status code.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP status the backend uses for an expired or missing session.
pub const UNAUTHORIZED_STATUS: u16 = 401;

/// Photo file sent to the multipart upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// Record area the photo belongs to (`lead` or `staff`).
    pub menu: String,
    /// Identifier of the record being updated, absent on create.
    pub photo_id: Option<String>,
}

define_port_error! {
    /// Errors surfaced by the request client.
    pub enum RequestError {
        /// The backend answered with a non-success status.
        Status { status: u16, message: String } =>
            "request failed with status {status}: {message}",
        /// The request timed out.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "request transport failed: {message}",
        /// The response body was not valid JSON.
        Decode { message: String } =>
            "response decode failed: {message}",
        /// The request could not be built (bad path, bad upload).
        InvalidRequest { message: String } =>
            "request invalid: {message}",
    }
}

impl RequestError {
    /// HTTP status code, when the backend answered.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the session must be re-established through sign-in.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(UNAUTHORIZED_STATUS))
    }
}

/// Port for JSON requests against the configured backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestClient: Send + Sync {
    /// `GET path` and return the parsed body.
    async fn get(&self, path: &str) -> Result<Value, RequestError>;

    /// `POST path` with a JSON body.
    async fn post(&self, path: &str, body: Value) -> Result<Value, RequestError>;

    /// `PUT path` with a JSON body.
    async fn put(&self, path: &str, body: Value) -> Result<Value, RequestError>;

    /// `POST path` with a multipart photo upload.
    async fn upload(&self, path: &str, upload: PhotoUpload) -> Result<Value, RequestError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unauthorized(RequestError::status(401_u16, "expired"), Some(401), true)]
    #[case::server(RequestError::status(500_u16, "boom"), Some(500), false)]
    #[case::transport(RequestError::transport("reset"), None, false)]
    fn exposes_status_codes(
        #[case] error: RequestError,
        #[case] status: Option<u16>,
        #[case] unauthorized: bool,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.is_unauthorized(), unauthorized);
    }
}
