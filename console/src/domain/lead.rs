//! Lead form: field state, validation, hydration and the save payload.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use super::{
    Address, ContactBook, ContactGroup, FieldErrors, PendingPhoto, SelectOption, format_api_date,
};

/// Field keys used by lead validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadField {
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Gender selection.
    Gender,
    /// Date of birth.
    DateOfBirth,
    /// Email address.
    Email,
    /// Occupation.
    Occupation,
    /// Lead source selection.
    LeadSource,
    /// First contact (relationship) date.
    ContactDate,
    /// Customer type selection.
    CustomerType,
    /// Business selection.
    Business,
    /// Postal address.
    Address,
    /// Contact channels.
    ContactData,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"\S+@\S+\.\S+")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lead row as returned by `lead/pagination`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadRecord {
    /// Backend identifier.
    pub lead_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender.
    pub gender: Option<SelectOption>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Email address.
    pub email: String,
    /// Occupation.
    pub occupation: String,
    /// Lead source.
    pub lead_source: Option<SelectOption>,
    /// Customer type.
    pub customer_type: Option<SelectOption>,
    /// Business.
    pub business: Option<SelectOption>,
    /// First contact date.
    pub relationship_date: Option<NaiveDate>,
    /// Postal address.
    pub address: Address,
    /// Free-form remark.
    pub remark: String,
    /// Contact channels in wire shape.
    pub contact_data: Vec<ContactGroup>,
    /// Stored photo URL.
    pub photo_url: Option<String>,
    /// Staff member who created the lead.
    pub initial_staff_id: String,
    /// Staff member currently responsible for the lead.
    pub current_staff_id: String,
    /// Whether the lead is active.
    pub is_active: bool,
    /// Creation timestamp as sent by the backend.
    pub created_date: Option<String>,
}

impl LeadRecord {
    /// Given and family name joined by a space.
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

pub(crate) fn join_name(first: &str, last: &str) -> String {
    [first.trim(), last.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body of `lead/create` and `lead/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadPayload {
    /// Present on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender identifier.
    pub gender_id: Option<String>,
    /// Customer type identifier.
    pub customer_type_id: Option<String>,
    /// Lead source identifier.
    pub lead_source_id: Option<String>,
    /// Village identifier; the backend derives the upper levels from it.
    pub village_id: Option<String>,
    /// Business identifier.
    pub business_id: Option<String>,
    /// Staff member responsible for the lead.
    pub current_staff_id: String,
    /// Staff member who created the lead.
    pub initial_staff_id: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    /// Email address.
    pub email: String,
    /// Occupation.
    pub occupation: String,
    /// House line of the address.
    pub home_address: String,
    /// Street line of the address.
    pub street_address: String,
    /// Always null; kept for the backend's schema.
    pub biz_description: Option<String>,
    /// `YYYY-MM-DD`.
    pub relationship_date: Option<String>,
    /// Free-form remark.
    pub remark: String,
    /// Stored photo URL.
    pub photo_url: Option<String>,
    /// Contact channels grouped by type.
    pub contact_data: Vec<ContactGroup>,
    /// Saved leads are always active.
    pub is_active: bool,
}

/// Editable lead form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadForm {
    /// Set when editing an existing lead.
    pub lead_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Gender.
    pub gender: Option<SelectOption>,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Email address.
    pub email: String,
    /// Occupation.
    pub occupation: String,
    /// Lead source.
    pub lead_source: Option<SelectOption>,
    /// First contact date.
    pub contact_date: Option<NaiveDate>,
    /// Customer type.
    pub customer_type: Option<SelectOption>,
    /// Business.
    pub business: Option<SelectOption>,
    /// Committed address.
    pub address: Address,
    /// Free-form remark.
    pub remark: String,
    /// Committed contact channels.
    pub contacts: ContactBook,
    /// Newly picked photo, uploaded on save.
    pub photo: Option<PendingPhoto>,
    /// Photo already stored for the lead.
    pub existing_photo_url: Option<String>,
    /// Staff member who created the lead.
    pub initial_staff_id: String,
    /// Signed-in staff member saving the form.
    pub current_staff_id: String,
}

impl LeadForm {
    /// Blank form for a new lead owned by the signed-in staff member.
    pub fn new(staff_id: impl Into<String>) -> Self {
        let staff_id = staff_id.into();
        Self {
            initial_staff_id: staff_id.clone(),
            current_staff_id: staff_id,
            ..Self::default()
        }
    }

    /// Populate the form from a stored lead.
    ///
    /// Channel type ids are resolved against `channel_types`; see
    /// [`ContactBook::from_groups`].
    pub fn from_record(record: LeadRecord, channel_types: &[SelectOption]) -> Self {
        Self {
            lead_id: Some(record.lead_id),
            first_name: record.first_name,
            last_name: record.last_name,
            gender: record.gender,
            date_of_birth: record.date_of_birth,
            email: record.email,
            occupation: record.occupation,
            lead_source: record.lead_source,
            contact_date: record.relationship_date,
            customer_type: record.customer_type,
            business: record.business,
            address: record.address,
            remark: record.remark,
            contacts: ContactBook::from_groups(record.contact_data, channel_types),
            photo: None,
            existing_photo_url: record.photo_url,
            initial_staff_id: record.initial_staff_id,
            current_staff_id: record.current_staff_id,
        }
    }

    /// Check every field; an empty map means the form can be saved.
    pub fn validate(&self) -> FieldErrors<LeadField> {
        let mut errors = FieldErrors::new();
        errors.check(
            self.first_name.trim().is_empty(),
            LeadField::FirstName,
            "First name is required.",
        );
        errors.check(
            self.last_name.trim().is_empty(),
            LeadField::LastName,
            "Last name is required.",
        );
        errors.check(
            self.gender.is_none(),
            LeadField::Gender,
            "Please select a gender.",
        );
        errors.check(
            self.date_of_birth.is_none(),
            LeadField::DateOfBirth,
            "Date of birth is required.",
        );
        if self.email.trim().is_empty() {
            errors.insert(LeadField::Email, "Email is required.");
        } else if !email_regex().is_match(&self.email) {
            errors.insert(LeadField::Email, "Email address is invalid.");
        }
        errors.check(
            self.occupation.trim().is_empty(),
            LeadField::Occupation,
            "Occupation is required.",
        );
        errors.check(
            self.lead_source.is_none(),
            LeadField::LeadSource,
            "Please select a lead source.",
        );
        errors.check(
            self.contact_date.is_none(),
            LeadField::ContactDate,
            "Contact Date is required.",
        );
        errors.check(
            self.customer_type.is_none(),
            LeadField::CustomerType,
            "Please select a customer type.",
        );
        errors.check(
            self.business.is_none(),
            LeadField::Business,
            "Please select a business.",
        );
        errors.check(
            self.address.province().is_none(),
            LeadField::Address,
            "A complete address with province is required.",
        );
        if let Err(reason) = self.contacts.validate() {
            errors.insert(LeadField::ContactData, reason.to_string());
        }
        errors
    }

    /// Save payload, with `photo_url` already resolved by the caller.
    pub fn to_payload(&self, photo_url: Option<String>) -> LeadPayload {
        LeadPayload {
            lead_id: self.lead_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender_id: option_value(self.gender.as_ref()),
            customer_type_id: option_value(self.customer_type.as_ref()),
            lead_source_id: option_value(self.lead_source.as_ref()),
            village_id: option_value(self.address.village()),
            business_id: option_value(self.business.as_ref()),
            current_staff_id: self.current_staff_id.clone(),
            initial_staff_id: self.initial_staff_id.clone(),
            date_of_birth: format_api_date(self.date_of_birth),
            email: self.email.clone(),
            occupation: self.occupation.clone(),
            home_address: self.address.home_address().to_owned(),
            street_address: self.address.street_address().to_owned(),
            biz_description: None,
            relationship_date: format_api_date(self.contact_date),
            remark: self.remark.clone(),
            photo_url,
            contact_data: self.contacts.to_groups(),
            is_active: true,
        }
    }
}

pub(crate) fn option_value(option: Option<&SelectOption>) -> Option<String> {
    option.map(|selected| selected.value().to_owned())
}

#[cfg(test)]
mod tests {
    //! Validation and payload coverage for the lead form.

    use super::*;
    use crate::domain::{AddressLevel, ContactEntry};
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn phone() -> SelectOption {
        SelectOption::new("1", "Phone")
    }

    fn contact_groups() -> Vec<ContactGroup> {
        vec![ContactGroup {
            channel_type_id: "1".to_owned(),
            contact_values: vec![ContactEntry {
                user_name: String::new(),
                contact_number: "012 345 678".to_owned(),
                remark: String::new(),
                is_primary: true,
            }],
        }]
    }

    fn address() -> Address {
        Address::from_levels(
            [
                Some(SelectOption::new("12", "Phnom Penh")),
                Some(SelectOption::new("1201", "Chamkar Mon")),
                Some(SelectOption::new("120101", "Tonle Basak")),
                Some(SelectOption::new("12010101", "Phum 1")),
            ],
            "12B",
            "St 310",
        )
    }

    #[fixture]
    fn record() -> LeadRecord {
        LeadRecord {
            lead_id: "42".to_owned(),
            first_name: "Dara".to_owned(),
            last_name: "Sok".to_owned(),
            gender: Some(SelectOption::new("2", "Female")),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 17),
            email: "dara@example.com".to_owned(),
            occupation: "Engineer".to_owned(),
            lead_source: Some(SelectOption::new("3", "Referral")),
            customer_type: Some(SelectOption::new("4", "Retail")),
            business: Some(SelectOption::new("5", "Banking")),
            relationship_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            address: address(),
            remark: "Met at expo".to_owned(),
            contact_data: contact_groups(),
            photo_url: Some("https://files.invalid/lead/42.png".to_owned()),
            initial_staff_id: "7".to_owned(),
            current_staff_id: "9".to_owned(),
            is_active: true,
            created_date: None,
        }
    }

    #[rstest]
    fn hydrated_record_is_valid(record: LeadRecord) {
        let form = LeadForm::from_record(record, &[phone()]);
        assert!(form.validate().is_empty());
    }

    #[rstest]
    fn blank_form_reports_every_required_field() {
        let errors = LeadForm::new("7").validate();

        assert_eq!(errors.len(), 12);
        assert_eq!(errors.get(&LeadField::Gender), Some("Please select a gender."));
        assert_eq!(
            errors.get(&LeadField::Address),
            Some("A complete address with province is required.")
        );
        assert_eq!(errors.get(&LeadField::ContactData), Some("Contact is required."));
    }

    #[rstest]
    #[case::missing("", Some("Email is required."))]
    #[case::no_domain("dara@", Some("Email address is invalid."))]
    #[case::no_tld("dara@example", Some("Email address is invalid."))]
    #[case::valid("dara@example.com", None)]
    fn checks_email_shape(record: LeadRecord, #[case] email: &str, #[case] expected: Option<&str>) {
        let mut form = LeadForm::from_record(record, &[phone()]);
        form.email = email.to_owned();

        assert_eq!(form.validate().get(&LeadField::Email), expected);
    }

    #[rstest]
    fn address_needs_only_a_province(record: LeadRecord) {
        let mut form = LeadForm::from_record(record, &[phone()]);
        form.address
            .select(AddressLevel::District, None)
            .expect("province is set");

        assert!(form.validate().get(&LeadField::Address).is_none());
    }

    #[rstest]
    fn unknown_channel_type_blocks_saving(record: LeadRecord) {
        let form = LeadForm::from_record(record, &[]);
        assert_eq!(
            form.validate().get(&LeadField::ContactData),
            Some("Each contact group must have a channel and each contact must have a number/ID.")
        );
    }

    #[rstest]
    fn payload_matches_the_backend_shape(record: LeadRecord) {
        let form = LeadForm::from_record(record, &[phone()]);
        let payload = serde_json::to_value(form.to_payload(form.existing_photo_url.clone()))
            .expect("payload serialises");

        assert_eq!(payload["lead_id"], json!("42"));
        assert_eq!(payload["gender_id"], json!("2"));
        assert_eq!(payload["village_id"], json!("12010101"));
        assert_eq!(payload["date_of_birth"], json!("1990-04-17"));
        assert_eq!(payload["relationship_date"], json!("2024-01-05"));
        assert_eq!(payload["biz_description"], json!(null));
        assert_eq!(payload["is_active"], json!(true));
        assert_eq!(payload["current_staff_id"], json!("9"));
        assert_eq!(
            payload["contact_data"][0]["contact_values"][0]["contact_number"],
            json!("012 345 678")
        );
    }

    #[rstest]
    fn create_payload_omits_the_lead_id() {
        let payload =
            serde_json::to_value(LeadForm::new("7").to_payload(None)).expect("payload serialises");

        assert!(payload.get("lead_id").is_none());
        assert_eq!(payload["initial_staff_id"], json!("7"));
    }

    #[rstest]
    fn joins_names_without_stray_spaces() {
        assert_eq!(join_name(" Dara ", ""), "Dara");
        assert_eq!(join_name("Dara", "Sok"), "Dara Sok");
    }
}
