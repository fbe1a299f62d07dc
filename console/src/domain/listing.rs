//! Table rows for the Lead and Staff listings.

use std::fmt;
use std::sync::Arc;

use pagination::{Page, PageRequest, Search};
use tracing::debug;

use super::ports::{LeadGateway, RecordGatewayError, StaffGateway};
use super::{ContactGroup, LeadRecord, SelectOption, StaffRecord};

/// Avatar shown when a record has no stored photo.
pub const PLACEHOLDER_AVATAR: &str = "/images/user/user-01.png";

/// Text shown for an empty cell.
pub const NOT_AVAILABLE: &str = "N/A";

/// Activity badge of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    /// Record is active.
    Active,
    /// Record is archived.
    Inactive,
}

impl RecordStatus {
    /// Status for an `is_active` flag.
    pub const fn from_flag(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        })
    }
}

/// Contact number of the primary value, if any group flags one.
pub fn primary_contact_number(groups: &[ContactGroup]) -> Option<&str> {
    groups
        .iter()
        .flat_map(|group| group.contact_values.iter())
        .find(|value| value.is_primary)
        .map(|value| value.contact_number.as_str())
        .filter(|number| !number.trim().is_empty())
}

fn or_not_available(text: impl AsRef<str>) -> String {
    let text = text.as_ref().trim();
    if text.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        text.to_owned()
    }
}

fn label_or_not_available(option: Option<&SelectOption>) -> String {
    or_not_available(option.map(SelectOption::label).unwrap_or_default())
}

fn avatar(url: Option<&str>) -> String {
    url.map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(PLACEHOLDER_AVATAR)
        .to_owned()
}

/// One row of the lead table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSummary {
    /// Backend identifier.
    pub lead_id: String,
    /// Given and family name.
    pub full_name: String,
    /// Photo URL or the placeholder.
    pub avatar: String,
    /// Gender label.
    pub gender: String,
    /// Primary contact number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Lead source label.
    pub lead_source: String,
    /// Customer type label.
    pub customer_type: String,
    /// Business label.
    pub business: String,
    /// Joined address.
    pub address: String,
    /// Activity badge.
    pub status: RecordStatus,
}

impl From<&LeadRecord> for LeadSummary {
    fn from(record: &LeadRecord) -> Self {
        Self {
            lead_id: record.lead_id.clone(),
            full_name: or_not_available(record.full_name()),
            avatar: avatar(record.photo_url.as_deref()),
            gender: label_or_not_available(record.gender.as_ref()),
            phone: or_not_available(primary_contact_number(&record.contact_data).unwrap_or_default()),
            email: or_not_available(&record.email),
            lead_source: label_or_not_available(record.lead_source.as_ref()),
            customer_type: label_or_not_available(record.customer_type.as_ref()),
            business: label_or_not_available(record.business.as_ref()),
            address: or_not_available(record.address.display_line()),
            status: RecordStatus::from_flag(record.is_active),
        }
    }
}

/// One row of the staff table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSummary {
    /// Backend identifier.
    pub staff_id: String,
    /// Human-facing staff code.
    pub staff_code: String,
    /// Given and family name.
    pub full_name: String,
    /// Photo URL or the placeholder.
    pub avatar: String,
    /// Gender label.
    pub gender: String,
    /// Primary contact number.
    pub phone: String,
    /// Position.
    pub position: String,
    /// Department.
    pub department: String,
    /// Employment type.
    pub employment_type: String,
    /// Joined address.
    pub address: String,
    /// Activity badge.
    pub status: RecordStatus,
}

impl From<&StaffRecord> for StaffSummary {
    fn from(record: &StaffRecord) -> Self {
        Self {
            staff_id: record.staff_id.clone(),
            staff_code: or_not_available(&record.staff_code),
            full_name: or_not_available(record.full_name()),
            avatar: avatar(record.photo_url()),
            gender: label_or_not_available(record.gender.as_ref()),
            phone: or_not_available(primary_contact_number(&record.contact_data).unwrap_or_default()),
            position: or_not_available(&record.position),
            department: or_not_available(&record.department),
            employment_type: or_not_available(&record.employment_type),
            address: or_not_available(record.address.display_line()),
            status: RecordStatus::from_flag(record.is_active),
        }
    }
}

/// Listing and lookup of Lead and Staff records.
#[derive(Clone)]
pub struct RecordDirectory {
    leads: Arc<dyn LeadGateway>,
    staff: Arc<dyn StaffGateway>,
}

impl RecordDirectory {
    /// Directory over the given gateways.
    pub fn new(leads: Arc<dyn LeadGateway>, staff: Arc<dyn StaffGateway>) -> Self {
        Self { leads, staff }
    }

    /// One page of lead rows.
    pub async fn lead_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<LeadSummary>, RecordGatewayError> {
        let page = self.leads.list(request).await?;
        debug!(
            page = request.page_number(),
            rows = page.rows.len(),
            total = page.total_rows,
            "lead page loaded"
        );
        Ok(page.map(|record| LeadSummary::from(&record)))
    }

    /// One page of staff rows.
    pub async fn staff_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<StaffSummary>, RecordGatewayError> {
        let page = self.staff.list(request).await?;
        debug!(
            page = request.page_number(),
            rows = page.rows.len(),
            total = page.total_rows,
            "staff page loaded"
        );
        Ok(page.map(|record| StaffSummary::from(&record)))
    }

    /// Load one lead for the update form.
    pub async fn find_lead(&self, lead_id: &str) -> Result<Option<LeadRecord>, RecordGatewayError> {
        let page = self.leads.list(&lookup_request("lead_id", lead_id)?).await?;
        Ok(page.rows.into_iter().find(|record| record.lead_id == lead_id))
    }

    /// Load one staff member for the update form.
    pub async fn find_staff(
        &self,
        staff_id: &str,
    ) -> Result<Option<StaffRecord>, RecordGatewayError> {
        let page = self
            .staff
            .list(&lookup_request("staff_id", staff_id)?)
            .await?;
        Ok(page
            .rows
            .into_iter()
            .find(|record| record.staff_id == staff_id))
    }
}

impl fmt::Debug for RecordDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDirectory").finish_non_exhaustive()
    }
}

fn lookup_request(search_type: &str, id: &str) -> Result<PageRequest, RecordGatewayError> {
    PageRequest::first(pagination::DEFAULT_PAGE_SIZE)
        .map(|request| request.with_search(Search::new(search_type, id)))
        .map_err(|error| RecordGatewayError::decode(error.to_string()))
}
