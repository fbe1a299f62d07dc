//! Staff form: field state, validation, hydration and the save payload.

use chrono::NaiveDate;
use serde::Serialize;

use super::lead::{join_name, option_value};
use super::{
    Address, ContactBook, ContactGroup, FieldErrors, PendingPhoto, SelectOption, format_api_date,
};

/// Field keys used by staff validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StaffField {
    /// Staff code (shown as "Staff ID").
    StaffCode,
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Gender selection.
    Gender,
    /// Date of birth.
    DateOfBirth,
    /// Department.
    Department,
    /// Position.
    Position,
    /// Employment type.
    EmploymentType,
    /// Employment level.
    EmploymentLevel,
    /// Employment start date.
    EmploymentStartDate,
    /// Employment end date.
    EmploymentEndDate,
    /// Postal address.
    Address,
    /// Contact channels.
    ContactData,
}

/// Staff row as returned by `staff/pagination`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffRecord {
    /// Backend identifier.
    pub staff_id: String,
    /// Human-facing staff code.
    pub staff_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender.
    pub gender: Option<SelectOption>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Position.
    pub position: String,
    /// Department.
    pub department: String,
    /// Employment type.
    pub employment_type: String,
    /// Employment level.
    pub employment_level: String,
    /// Employment start date.
    pub employment_start_date: Option<NaiveDate>,
    /// Employment end date.
    pub employment_end_date: Option<NaiveDate>,
    /// Address; the house and street lines are split from `current_address`.
    pub address: Address,
    /// Stored photo URLs, newest first.
    pub photo_urls: Vec<String>,
    /// Contact channels in wire shape.
    pub contact_data: Vec<ContactGroup>,
    /// Whether the staff member is active.
    pub is_active: bool,
}

impl StaffRecord {
    /// Given and family name joined by a space.
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    /// First stored photo URL.
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_urls
            .iter()
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
    }
}

/// Split the single `current_address` line into house and street parts.
pub fn split_current_address(current_address: &str) -> (String, String) {
    match current_address.split_once(", ") {
        Some((home, street)) => (home.trim().to_owned(), street.trim().to_owned()),
        None => (current_address.trim().to_owned(), String::new()),
    }
}

/// Body of `staff/create` and `staff/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffPayload {
    /// Record identifier; the staff code on create.
    pub staff_id: String,
    /// Human-facing staff code.
    pub staff_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender identifier.
    pub gender_id: Option<String>,
    /// Village identifier.
    pub village_id: Option<String>,
    /// Manager identifier, when one was picked.
    pub manager_id: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    /// Position.
    pub position: String,
    /// Department.
    pub department: String,
    /// Employment type.
    pub employment_type: String,
    /// `YYYY-MM-DD`.
    pub employment_start_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub employment_end_date: Option<String>,
    /// Employment level.
    pub employment_level: String,
    /// `"{home}, {street}"`.
    pub current_address: String,
    /// Stored photo URLs; the backend expects an array.
    pub photo_url: Vec<String>,
    /// Contact channels grouped by type.
    pub contact_data: Vec<ContactGroup>,
    /// Saved staff members are always active.
    pub is_active: bool,
}

/// Editable staff form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffForm {
    /// Set when editing an existing staff member.
    pub staff_id: Option<String>,
    /// Human-facing staff code.
    pub staff_code: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender.
    pub gender: Option<SelectOption>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Position.
    pub position: String,
    /// Department.
    pub department: String,
    /// Employment type.
    pub employment_type: String,
    /// Employment level.
    pub employment_level: String,
    /// Employment start date.
    pub employment_start_date: Option<NaiveDate>,
    /// Employment end date.
    pub employment_end_date: Option<NaiveDate>,
    /// Optional manager.
    pub manager: Option<SelectOption>,
    /// Committed address.
    pub address: Address,
    /// Committed contact channels.
    pub contacts: ContactBook,
    /// Newly picked photo, uploaded on save.
    pub photo: Option<PendingPhoto>,
    /// Photo already stored for the staff member.
    pub existing_photo_url: Option<String>,
    /// Signed-in user saving the form; blank means the session is gone.
    pub signed_in_user_id: String,
}

impl StaffForm {
    /// Blank form saved by the signed-in user.
    pub fn new(signed_in_user_id: impl Into<String>) -> Self {
        Self {
            signed_in_user_id: signed_in_user_id.into(),
            ..Self::default()
        }
    }

    /// Populate the form from a stored staff member.
    pub fn from_record(
        record: StaffRecord,
        channel_types: &[SelectOption],
        signed_in_user_id: impl Into<String>,
    ) -> Self {
        let existing_photo_url = record.photo_url().map(str::to_owned);
        Self {
            staff_id: Some(record.staff_id),
            staff_code: record.staff_code,
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            position: record.position,
            department: record.department,
            employment_type: record.employment_type,
            employment_level: record.employment_level,
            employment_start_date: record.employment_start_date,
            employment_end_date: record.employment_end_date,
            manager: None,
            address: record.address,
            contacts: ContactBook::from_groups(record.contact_data, channel_types),
            photo: None,
            existing_photo_url,
            signed_in_user_id: signed_in_user_id.into(),
        }
    }

    /// Identifier used for the record and its photo: the stored id on
    /// update, the staff code on create.
    pub fn record_id(&self) -> &str {
        self.staff_id.as_deref().unwrap_or(&self.staff_code)
    }

    /// Check every field; an empty map means the form can be saved.
    pub fn validate(&self) -> FieldErrors<StaffField> {
        let mut errors = FieldErrors::new();
        let text_checks = [
            (&self.staff_code, StaffField::StaffCode, "Staff ID is required."),
            (&self.first_name, StaffField::FirstName, "First name is required."),
            (&self.last_name, StaffField::LastName, "Last name is required."),
            (&self.department, StaffField::Department, "Department is required."),
            (&self.position, StaffField::Position, "Position is required."),
            (
                &self.employment_type,
                StaffField::EmploymentType,
                "Employment Type is required.",
            ),
            (
                &self.employment_level,
                StaffField::EmploymentLevel,
                "Employment Level is required.",
            ),
        ];
        for (text, field, message) in text_checks {
            errors.check(text.trim().is_empty(), field, message);
        }
        errors.check(self.gender.is_none(), StaffField::Gender, "Gender is required.");
        errors.check(
            self.date_of_birth.is_none(),
            StaffField::DateOfBirth,
            "Date of birth is required.",
        );
        errors.check(
            self.employment_start_date.is_none(),
            StaffField::EmploymentStartDate,
            "Employment Start date is required.",
        );
        errors.check(
            self.employment_end_date.is_none(),
            StaffField::EmploymentEndDate,
            "Employment End date is required.",
        );
        errors.check(
            self.address.province().is_none(),
            StaffField::Address,
            "A complete address with province is required.",
        );
        if let Err(reason) = self.contacts.validate() {
            errors.insert(StaffField::ContactData, reason.to_string());
        }
        errors
    }

    /// Save payload, with `photo_url` already resolved by the caller.
    pub fn to_payload(&self, photo_url: Option<String>) -> StaffPayload {
        StaffPayload {
            staff_id: self.record_id().to_owned(),
            staff_code: self.staff_code.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender_id: option_value(self.gender.as_ref()),
            village_id: option_value(self.address.village()),
            manager_id: option_value(self.manager.as_ref()),
            date_of_birth: format_api_date(self.date_of_birth),
            position: self.position.clone(),
            department: self.department.clone(),
            employment_type: self.employment_type.clone(),
            employment_start_date: format_api_date(self.employment_start_date),
            employment_end_date: format_api_date(self.employment_end_date),
            employment_level: self.employment_level.clone(),
            current_address: format!(
                "{}, {}",
                self.address.home_address(),
                self.address.street_address()
            ),
            photo_url: photo_url.into_iter().collect(),
            contact_data: self.contacts.to_groups(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Validation and payload coverage for the staff form.

    use super::*;
    use crate::domain::ContactEntry;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn record() -> StaffRecord {
        let (home, street) = split_current_address("12B, St 310");
        StaffRecord {
            staff_id: "S-001".to_owned(),
            staff_code: "EMP-001".to_owned(),
            first_name: "Vanna".to_owned(),
            last_name: "Chan".to_owned(),
            gender: Some(SelectOption::new("1", "Male")),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 2, 29),
            position: "Sales Lead".to_owned(),
            department: "Sales".to_owned(),
            employment_type: "Full-time".to_owned(),
            employment_level: "Senior".to_owned(),
            employment_start_date: NaiveDate::from_ymd_opt(2020, 3, 1),
            employment_end_date: NaiveDate::from_ymd_opt(2030, 3, 1),
            address: Address::from_levels(
                [Some(SelectOption::new("12", "Phnom Penh")), None, None, None],
                home,
                street,
            ),
            photo_urls: vec![String::new(), "https://files.invalid/staff/1.png".to_owned()],
            contact_data: vec![ContactGroup {
                channel_type_id: "1".to_owned(),
                contact_values: vec![ContactEntry {
                    user_name: String::new(),
                    contact_number: "012 345 678".to_owned(),
                    remark: String::new(),
                    is_primary: false,
                }],
            }],
            is_active: true,
        }
    }

    #[rstest]
    fn hydrated_record_is_valid_and_keeps_the_photo(record: StaffRecord) {
        let form = StaffForm::from_record(record, &[SelectOption::new("1", "Phone")], "u-1");

        assert!(form.validate().is_empty());
        assert_eq!(
            form.existing_photo_url.as_deref(),
            Some("https://files.invalid/staff/1.png")
        );
        assert!(form.contacts.primary().is_some());
    }

    #[rstest]
    fn blank_form_reports_every_required_field() {
        let errors = StaffForm::new("u-1").validate();

        assert_eq!(errors.len(), 13);
        assert_eq!(errors.get(&StaffField::StaffCode), Some("Staff ID is required."));
        assert_eq!(
            errors.get(&StaffField::EmploymentEndDate),
            Some("Employment End date is required.")
        );
    }

    #[rstest]
    fn update_payload_keeps_the_stored_id(record: StaffRecord) {
        let form = StaffForm::from_record(record, &[SelectOption::new("1", "Phone")], "u-1");
        let payload = serde_json::to_value(form.to_payload(form.existing_photo_url.clone()))
            .expect("payload serialises");

        assert_eq!(payload["staff_id"], json!("S-001"));
        assert_eq!(payload["staff_code"], json!("EMP-001"));
        assert_eq!(payload["current_address"], json!("12B, St 310"));
        assert_eq!(payload["photo_url"], json!(["https://files.invalid/staff/1.png"]));
        assert_eq!(payload["village_id"], json!(null));
        assert_eq!(payload["employment_start_date"], json!("2020-03-01"));
    }

    #[rstest]
    fn create_payload_uses_the_code_as_id() {
        let mut form = StaffForm::new("u-1");
        form.staff_code = "EMP-002".to_owned();

        let payload = form.to_payload(None);

        assert_eq!(payload.staff_id, "EMP-002");
        assert!(payload.photo_url.is_empty());
    }

    #[rstest]
    #[case::both("12B, St 310", ("12B", "St 310"))]
    #[case::home_only("12B", ("12B", ""))]
    #[case::street_has_commas("12B, St 310, Block C", ("12B", "St 310, Block C"))]
    fn splits_the_current_address(#[case] raw: &str, #[case] expected: (&str, &str)) {
        let (home, street) = split_current_address(raw);
        assert_eq!((home.as_str(), street.as_str()), expected);
    }
}
