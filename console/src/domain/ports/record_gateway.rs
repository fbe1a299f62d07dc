//! Driven ports for Lead and Staff records and their photos.

use std::sync::Mutex;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::{PhotoUpload, define_port_error};
use crate::domain::{LeadPayload, LeadRecord, StaffPayload, StaffRecord};

define_port_error! {
    /// Errors surfaced by the record gateways.
    pub enum RecordGatewayError {
        /// The session is no longer valid and the user must sign in again.
        Unauthorized { message: String } =>
            "record request unauthorised: {message}",
        /// The backend refused the request.
        Rejected { status: u16, message: String } =>
            "record request rejected with status {status}: {message}",
        /// Network transport failed before a response arrived.
        Transport { message: String } =>
            "record transport failed: {message}",
        /// The response body did not have the expected shape.
        Decode { message: String } =>
            "record decode failed: {message}",
    }
}

impl RecordGatewayError {
    /// Whether the caller should route the user to sign-in.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Port for listing and saving Lead records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Fetch one page of leads.
    async fn list(&self, request: &PageRequest) -> Result<Page<LeadRecord>, RecordGatewayError>;

    /// Create a lead.
    async fn create(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError>;

    /// Update an existing lead.
    async fn update(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError>;
}

/// Port for listing and saving Staff records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffGateway: Send + Sync {
    /// Fetch one page of staff members.
    async fn list(&self, request: &PageRequest)
    -> Result<Page<StaffRecord>, RecordGatewayError>;

    /// Create a staff member.
    async fn create(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError>;

    /// Update an existing staff member.
    async fn update(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError>;
}

/// Port for storing record photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Upload a photo and return the URL the backend stored it under.
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<String, RecordGatewayError>;
}

/// In-memory lead gateway that records every saved payload.
#[derive(Debug, Default)]
pub struct FixtureLeadGateway {
    rows: Vec<LeadRecord>,
    saved: Mutex<Vec<LeadPayload>>,
}

impl FixtureLeadGateway {
    /// Serve `rows` as a single page.
    #[must_use]
    pub fn with_rows(rows: Vec<LeadRecord>) -> Self {
        Self {
            rows,
            saved: Mutex::default(),
        }
    }

    /// Payloads passed to `create` or `update`, oldest first.
    pub fn saved(&self) -> Vec<LeadPayload> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }

    fn record(&self, payload: &LeadPayload) {
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(payload.clone());
        }
    }
}

#[async_trait]
impl LeadGateway for FixtureLeadGateway {
    async fn list(&self, _request: &PageRequest) -> Result<Page<LeadRecord>, RecordGatewayError> {
        Ok(Page {
            rows: self.rows.clone(),
            total_rows: self.rows.len() as u64,
        })
    }

    async fn create(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError> {
        self.record(payload);
        Ok(())
    }

    async fn update(&self, payload: &LeadPayload) -> Result<(), RecordGatewayError> {
        self.record(payload);
        Ok(())
    }
}

/// In-memory staff gateway that records every saved payload.
#[derive(Debug, Default)]
pub struct FixtureStaffGateway {
    rows: Vec<StaffRecord>,
    saved: Mutex<Vec<StaffPayload>>,
}

impl FixtureStaffGateway {
    /// Serve `rows` as a single page.
    #[must_use]
    pub fn with_rows(rows: Vec<StaffRecord>) -> Self {
        Self {
            rows,
            saved: Mutex::default(),
        }
    }

    /// Payloads passed to `create` or `update`, oldest first.
    pub fn saved(&self) -> Vec<StaffPayload> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }

    fn record(&self, payload: &StaffPayload) {
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(payload.clone());
        }
    }
}

#[async_trait]
impl StaffGateway for FixtureStaffGateway {
    async fn list(
        &self,
        _request: &PageRequest,
    ) -> Result<Page<StaffRecord>, RecordGatewayError> {
        Ok(Page {
            rows: self.rows.clone(),
            total_rows: self.rows.len() as u64,
        })
    }

    async fn create(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError> {
        self.record(payload);
        Ok(())
    }

    async fn update(&self, payload: &StaffPayload) -> Result<(), RecordGatewayError> {
        self.record(payload);
        Ok(())
    }
}

/// Photo store that answers every upload with a URL built from the file name.
#[derive(Debug, Clone)]
pub struct FixturePhotoStore {
    base_url: String,
}

impl Default for FixturePhotoStore {
    fn default() -> Self {
        Self {
            base_url: "https://files.invalid/photos".to_owned(),
        }
    }
}

#[async_trait]
impl PhotoStore for FixturePhotoStore {
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<String, RecordGatewayError> {
        Ok(format!(
            "{}/{}/{}",
            self.base_url, upload.menu, upload.file_name
        ))
    }
}
