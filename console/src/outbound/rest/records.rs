//! REST adapters for Lead and Staff records and photo uploads.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest, decode_page};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{LeadRowDto, StaffRowDto};
use super::map_request_error;
use crate::domain::ports::{
    LeadGateway, PhotoStore, PhotoUpload, RecordGatewayError, RequestClient, RequestError,
    StaffGateway, UNAUTHORIZED_STATUS,
};
use crate::domain::{LeadPayload, LeadRecord, StaffPayload, StaffRecord};

const LEAD_PAGINATION_PATH: &str = "lead/pagination";
const LEAD_CREATE_PATH: &str = "lead/create";
const LEAD_UPDATE_PATH: &str = "lead/update";
const STAFF_PAGINATION_PATH: &str = "staff/pagination";
const STAFF_CREATE_PATH: &str = "staff/create";
const STAFF_UPDATE_PATH: &str = "staff/update";
const PHOTO_UPLOAD_PATH: &str = "files/upload-one-photo";

fn map_error(error: RequestError) -> RecordGatewayError {
    map_request_error(
        error,
        RecordGatewayError::unauthorized,
        RecordGatewayError::rejected,
        RecordGatewayError::transport,
        RecordGatewayError::decode,
    )
}

#[derive(Debug, Clone, Copy)]
enum SaveMode {
    Post,
    Put,
}

fn encode<T: Serialize>(payload: &T) -> Result<Value, RecordGatewayError> {
    serde_json::to_value(payload)
        .map_err(|error| RecordGatewayError::decode(format!("payload encoding failed: {error}")))
}

/// Decode a listing response, skipping rows that cannot be mapped.
fn decode_rows<Dto, Record>(
    path: &str,
    body: Value,
    into_domain: impl Fn(Dto) -> Result<Record, String>,
) -> Result<Page<Record>, RecordGatewayError>
where
    Dto: DeserializeOwned,
{
    let page = decode_page::<Value>(body)
        .map_err(|error| RecordGatewayError::decode(error.to_string()))?;
    let decoded = page.filter_map(|row| {
        let mapped = serde_json::from_value::<Dto>(row)
            .map_err(|error| error.to_string())
            .and_then(&into_domain);
        match mapped {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!(%path, %reason, "skipping undecodable row");
                None
            }
        }
    });
    debug!(%path, rows = decoded.rows.len(), total = decoded.total_rows, "page decoded");
    Ok(decoded)
}

/// Reject saves whose body reports a failing `statusCode`.
///
/// The backend wraps save results as `[{ "statusCode": 200, ... }]`; some
/// failures come back with a 2xx HTTP status and an error code inside.
fn check_save_envelope(body: &Value) -> Result<(), RecordGatewayError> {
    let envelope = match body {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(body),
        _ => None,
    };
    let Some(envelope) = envelope else {
        return Ok(());
    };
    let Some(status) = envelope
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
    else {
        return Ok(());
    };
    if (200..300).contains(&status) {
        return Ok(());
    }
    let message = envelope
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("save rejected")
        .to_owned();
    if status == UNAUTHORIZED_STATUS {
        Err(RecordGatewayError::unauthorized(message))
    } else {
        Err(RecordGatewayError::rejected(status, message))
    }
}

macro_rules! debug_without_client {
    ($name:ident) => {
        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }
    };
}

/// Lead gateway backed by the REST request client.
#[derive(Clone)]
pub struct RestLeadGateway {
    client: Arc<dyn RequestClient>,
}

impl RestLeadGateway {
    /// Gateway issuing requests through `client`.
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }

    async fn save(
        &self,
        path: &str,
        payload: &LeadPayload,
        mode: SaveMode,
    ) -> Result<(), RecordGatewayError> {
        let body = encode(payload)?;
        let response = match mode {
            SaveMode::Post => self.client.post(path, body).await,
            SaveMode::Put => self.client.put(path, body).await,
        };
        check_save_envelope(&response.map_err(map_error)?)
    }
}

debug_without_client!(RestLeadGateway);

#[async_trait]
impl LeadGateway for RestLeadGateway {
    async fn list(&self, request: &PageRequest) -> Result<Page<LeadRecord>, RecordGatewayError> {
        let body = self
            .client
            .post(LEAD_PAGINATION_PATH, encode(request)?)
            .await
            .map_err(map_error)?;
        decode_rows(LEAD_PAGINATION_PATH, body, LeadRowDto::into_domain)
    }

    async fn create(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError> {
        self.save(LEAD_CREATE_PATH, payload, SaveMode::Post).await
    }

    async fn update(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError> {
        self.save(LEAD_UPDATE_PATH, payload, SaveMode::Put).await
    }
}

/// Staff gateway backed by the REST request client.
#[derive(Clone)]
pub struct RestStaffGateway {
    client: Arc<dyn RequestClient>,
}

impl RestStaffGateway {
    /// Gateway issuing requests through `client`.
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }

    async fn save(
        &self,
        path: &str,
        payload: &StaffPayload,
        mode: SaveMode,
    ) -> Result<(), RecordGatewayError> {
        let body = encode(payload)?;
        let response = match mode {
            SaveMode::Post => self.client.post(path, body).await,
            SaveMode::Put => self.client.put(path, body).await,
        };
        check_save_envelope(&response.map_err(map_error)?)
    }
}

debug_without_client!(RestStaffGateway);

#[async_trait]
impl StaffGateway for RestStaffGateway {
    async fn list(
        &self,
        request: &PageRequest,
    ) -> Result<Page<StaffRecord>, RecordGatewayError> {
        let body = self
            .client
            .post(STAFF_PAGINATION_PATH, encode(request)?)
            .await
            .map_err(map_error)?;
        decode_rows(STAFF_PAGINATION_PATH, body, StaffRowDto::into_domain)
    }

    async fn create(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError> {
        self.save(STAFF_CREATE_PATH, payload, SaveMode::Post).await
    }

    async fn update(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError> {
        self.save(STAFF_UPDATE_PATH, payload, SaveMode::Put).await
    }
}

/// Photo store backed by the multipart upload endpoint.
#[derive(Clone)]
pub struct RestPhotoStore {
    client: Arc<dyn RequestClient>,
}

impl RestPhotoStore {
    /// Store issuing uploads through `client`.
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self { client }
    }
}

debug_without_client!(RestPhotoStore);

#[async_trait]
impl PhotoStore for RestPhotoStore {
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<String, RecordGatewayError> {
        let body = self
            .client
            .upload(PHOTO_UPLOAD_PATH, upload)
            .await
            .map_err(map_error)?;
        body.get("imageUrl")
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
            .map(str::to_owned)
            .ok_or_else(|| RecordGatewayError::decode("upload response missing imageUrl"))
    }
}
