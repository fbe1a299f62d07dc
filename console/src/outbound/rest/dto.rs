//! DTOs for decoding listing rows from the REST backend.
//!
//! The backend is loose about scalar types: identifiers arrive as numbers or
//! strings, and any text column may be `null`. Rows are decoded leniently here
//! and mapped into domain records in one pass.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{
    Address, ContactEntry, ContactGroup, LeadRecord, SelectOption, StaffRecord, parse_api_date,
    scalar_text, split_current_address,
};

fn loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(scalar_text)
        .filter(|text| !text.trim().is_empty()))
}

fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_id(deserializer)?.unwrap_or_default())
}

fn loose_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(number)) => number.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(text)) => matches!(text.trim(), "true" | "1"),
        _ => false,
    })
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ContactEntryDto {
    #[serde(default, deserialize_with = "loose_text")]
    user_name: String,
    #[serde(default, deserialize_with = "loose_text")]
    contact_number: String,
    #[serde(default, deserialize_with = "loose_text")]
    remark: String,
    #[serde(default, deserialize_with = "loose_flag")]
    is_primary: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ContactGroupDto {
    #[serde(default, deserialize_with = "loose_text")]
    channel_type_id: String,
    #[serde(default)]
    contact_values: Option<Vec<ContactEntryDto>>,
}

impl ContactGroupDto {
    fn into_domain(self) -> ContactGroup {
        ContactGroup {
            channel_type_id: self.channel_type_id,
            contact_values: self
                .contact_values
                .unwrap_or_default()
                .into_iter()
                .map(|entry| ContactEntry {
                    user_name: entry.user_name,
                    contact_number: entry.contact_number,
                    remark: entry.remark,
                    is_primary: entry.is_primary,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AddressColumnsDto {
    #[serde(default, deserialize_with = "loose_id")]
    province_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    province_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    district_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    district_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    commune_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    commune_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    village_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    village_name: String,
}

impl AddressColumnsDto {
    fn into_levels(self) -> [Option<SelectOption>; 4] {
        [
            option(self.province_id, self.province_name),
            option(self.district_id, self.district_name),
            option(self.commune_id, self.commune_name),
            option(self.village_id, self.village_name),
        ]
    }
}

fn option(id: Option<String>, name: String) -> Option<SelectOption> {
    id.map(|value| SelectOption::new(value, name))
}

fn date(raw: Option<String>) -> Option<chrono::NaiveDate> {
    raw.as_deref().and_then(parse_api_date)
}

fn contact_groups(groups: Option<Vec<ContactGroupDto>>) -> Vec<ContactGroup> {
    groups
        .unwrap_or_default()
        .into_iter()
        .map(ContactGroupDto::into_domain)
        .collect()
}

#[derive(Debug, Deserialize)]
pub(super) struct LeadRowDto {
    #[serde(default, deserialize_with = "loose_id")]
    lead_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    first_name: String,
    #[serde(default, deserialize_with = "loose_text")]
    last_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    gender_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    gender_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    email: String,
    #[serde(default, deserialize_with = "loose_text")]
    occupation: String,
    #[serde(default, deserialize_with = "loose_id")]
    lead_source_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    lead_source_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    customer_type_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    customer_type_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    business_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    business_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    relationship_date: Option<String>,
    #[serde(flatten)]
    address: AddressColumnsDto,
    #[serde(default, deserialize_with = "loose_text")]
    home_address: String,
    #[serde(default, deserialize_with = "loose_text")]
    street_address: String,
    #[serde(default, deserialize_with = "loose_text")]
    remark: String,
    #[serde(default)]
    contact_data: Option<Vec<ContactGroupDto>>,
    #[serde(default, deserialize_with = "loose_id")]
    photo_url: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    initial_staff_id: String,
    #[serde(default, deserialize_with = "loose_text")]
    current_staff_id: String,
    #[serde(default, deserialize_with = "loose_flag")]
    is_active: bool,
    #[serde(default, deserialize_with = "loose_id")]
    created_date: Option<String>,
}

impl LeadRowDto {
    pub(super) fn into_domain(self) -> Result<LeadRecord, String> {
        let lead_id = self
            .lead_id
            .ok_or_else(|| "lead row missing lead_id".to_owned())?;
        Ok(LeadRecord {
            lead_id,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: option(self.gender_id, self.gender_name),
            date_of_birth: date(self.date_of_birth),
            email: self.email,
            occupation: self.occupation,
            lead_source: option(self.lead_source_id, self.lead_source_name),
            customer_type: option(self.customer_type_id, self.customer_type_name),
            business: option(self.business_id, self.business_name),
            relationship_date: date(self.relationship_date),
            address: Address::from_levels(
                self.address.into_levels(),
                self.home_address,
                self.street_address,
            ),
            remark: self.remark,
            contact_data: contact_groups(self.contact_data),
            photo_url: self.photo_url,
            initial_staff_id: self.initial_staff_id,
            current_staff_id: self.current_staff_id,
            is_active: self.is_active,
            created_date: self.created_date,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StaffRowDto {
    #[serde(default, deserialize_with = "loose_id")]
    staff_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    staff_code: String,
    #[serde(default, deserialize_with = "loose_text")]
    first_name: String,
    #[serde(default, deserialize_with = "loose_text")]
    last_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    gender_id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    gender_name: String,
    #[serde(default, deserialize_with = "loose_id")]
    date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    position: String,
    #[serde(default, deserialize_with = "loose_text")]
    department: String,
    #[serde(default, deserialize_with = "loose_text")]
    employment_type: String,
    #[serde(default, deserialize_with = "loose_text")]
    employment_level: String,
    #[serde(default, deserialize_with = "loose_id")]
    employment_start_date: Option<String>,
    #[serde(default, deserialize_with = "loose_id")]
    employment_end_date: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    current_address: String,
    #[serde(flatten)]
    address: AddressColumnsDto,
    #[serde(default)]
    photo_url: Option<Value>,
    #[serde(default)]
    contact_data: Option<Vec<ContactGroupDto>>,
    #[serde(default, deserialize_with = "loose_flag")]
    is_active: bool,
}

impl StaffRowDto {
    pub(super) fn into_domain(self) -> Result<StaffRecord, String> {
        let staff_id = self
            .staff_id
            .ok_or_else(|| "staff row missing staff_id".to_owned())?;
        let (home, street) = split_current_address(&self.current_address);
        Ok(StaffRecord {
            staff_id,
            staff_code: self.staff_code,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: option(self.gender_id, self.gender_name),
            date_of_birth: date(self.date_of_birth),
            position: self.position,
            department: self.department,
            employment_type: self.employment_type,
            employment_level: self.employment_level,
            employment_start_date: date(self.employment_start_date),
            employment_end_date: date(self.employment_end_date),
            address: Address::from_levels(self.address.into_levels(), home, street),
            photo_urls: photo_urls(self.photo_url),
            contact_data: contact_groups(self.contact_data),
            is_active: self.is_active,
        })
    }
}

/// Staff photos arrive as an array of URLs, a single URL or `null`.
fn photo_urls(raw: Option<Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|url| !url.trim().is_empty())
            .collect(),
        Some(Value::String(url)) if !url.trim().is_empty() => vec![url],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for lenient row decoding.

    use super::*;
    use crate::domain::AddressLevel;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn decodes_lead_rows_with_numeric_ids_and_nulls() {
        let row: LeadRowDto = serde_json::from_value(json!({
            "lead_id": 42,
            "first_name": "Dara",
            "last_name": null,
            "gender_id": 2,
            "gender_name": "Female",
            "date_of_birth": "1990-04-17T00:00:00.000Z",
            "province_id": 12,
            "province_name": "Phnom Penh",
            "district_id": null,
            "village_id": 99,
            "village_name": "Orphan",
            "contact_data": [
                { "channel_type_id": 1, "contact_values": [
                    { "contact_number": "012", "is_primary": 1 }
                ] },
                { "channel_type_id": 2, "contact_values": null }
            ],
            "is_active": true
        }))
        .expect("row decodes");

        let record = row.into_domain().expect("row maps");

        assert_eq!(record.lead_id, "42");
        assert_eq!(record.last_name, "");
        assert_eq!(record.gender.as_ref().map(SelectOption::value), Some("2"));
        assert_eq!(record.date_of_birth, chrono::NaiveDate::from_ymd_opt(1990, 4, 17));
        assert!(record.address.selection(AddressLevel::Province).is_some());
        assert!(record.address.village().is_none());
        assert_eq!(record.contact_data.len(), 2);
        assert!(record.contact_data[0].contact_values[0].is_primary);
        assert!(record.contact_data[1].contact_values.is_empty());
    }

    #[test]
    fn lead_rows_without_an_id_are_rejected() {
        let row: LeadRowDto =
            serde_json::from_value(json!({ "first_name": "Dara" })).expect("row decodes");
        assert!(row.into_domain().is_err());
    }

    #[test]
    fn decodes_staff_rows_and_splits_the_address_line() {
        let row: StaffRowDto = serde_json::from_value(json!({
            "staff_id": "S-1",
            "staff_code": "EMP-1",
            "current_address": "12B, St 310",
            "photo_url": [null, "https://files.invalid/s.png"],
            "is_active": "1"
        }))
        .expect("row decodes");

        let record = row.into_domain().expect("row maps");

        assert_eq!(record.address.home_address(), "12B");
        assert_eq!(record.address.street_address(), "St 310");
        assert_eq!(record.photo_urls, vec!["https://files.invalid/s.png"]);
        assert!(record.is_active);
    }

    #[rstest]
    #[case::array(json!(["a", ""]), vec!["a"])]
    #[case::single(json!("a"), vec!["a"])]
    #[case::null(Value::Null, vec![])]
    fn normalises_photo_urls(#[case] raw: Value, #[case] expected: Vec<&str>) {
        assert_eq!(photo_urls(Some(raw)), expected);
    }
}
