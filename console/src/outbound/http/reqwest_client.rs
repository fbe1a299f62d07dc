//! Reqwest-backed request client.
//!
//! This adapter owns transport details only: URL joining, timeouts, HTTP
//! status mapping and JSON decoding. Domain meaning is added by the REST
//! adapters layered on top of it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{PhotoUpload, RequestClient, RequestError};

const DEFAULT_USER_AGENT: &str = concat!("crm-console/", env!("CARGO_PKG_VERSION"));

/// Request client that sends JSON requests below one base URL.
#[derive(Debug, Clone)]
pub struct HttpRequestClient {
    client: Client,
    base_url: Url,
    user_agent: String,
}

impl HttpRequestClient {
    /// Build a client with an explicit request timeout.
    ///
    /// `base_url` gains a trailing slash when missing so that relative paths
    /// resolve below it rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        user_agent: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            user_agent: user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        })
    }

    /// Base URL every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        resolve(&self.base_url, path)
    }

    async fn send(
        &self,
        method: &str,
        url: Url,
        request: RequestBuilder,
    ) -> Result<Value, RequestError> {
        debug!(%method, %url, "sending request");
        let response = request
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            %method,
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_body(body.as_ref())
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn get(&self, path: &str) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        let request = self.client.get(url.clone());
        self.send("GET", url, request).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        let request = self.client.post(url.clone()).json(&body);
        self.send("POST", url, request).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        let request = self.client.put(url.clone()).json(&body);
        self.send("PUT", url, request).await
    }

    async fn upload(&self, path: &str, upload: PhotoUpload) -> Result<Value, RequestError> {
        let url = self.endpoint(path)?;
        let form = photo_form(upload)?;
        let request = self.client.post(url.clone()).multipart(form);
        self.send("POST", url, request).await
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn resolve(base_url: &Url, path: &str) -> Result<Url, RequestError> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() {
        return Err(RequestError::invalid_request("request path must not be blank"));
    }
    base_url
        .join(relative)
        .map_err(|error| RequestError::invalid_request(format!("invalid path {path:?}: {error}")))
}

fn photo_form(upload: PhotoUpload) -> Result<Form, RequestError> {
    let part = Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|error| {
            RequestError::invalid_request(format!(
                "invalid photo content type {:?}: {error}",
                upload.content_type
            ))
        })?;
    let form = Form::new().part("photo", part).text("menu", upload.menu);
    Ok(match upload.photo_id {
        Some(photo_id) => form.text("photoId", photo_id),
        None => form,
    })
}

fn parse_body(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|error| RequestError::decode(format!("invalid JSON response: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> RequestError {
    if error.is_timeout() {
        RequestError::timeout(error.to_string())
    } else {
        RequestError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RequestError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        body_preview
    };
    RequestError::status(status.as_u16(), message)
}

/// Whitespace-collapsed start of an error body, for backend rejection messages.
fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
