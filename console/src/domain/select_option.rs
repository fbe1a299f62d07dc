//! Dropdown option model shared by every select control.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `{value, label}` dropdown entry.
///
/// Two options are equal when their `value`s match; the label is display
/// text only.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    value: String,
    label: String,
}

impl SelectOption {
    /// Build an option from an identifier and its display label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Backend identifier carried by the option.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human readable label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for SelectOption {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for SelectOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// Convert backend reference records into dropdown options.
///
/// `records` is expected to be an array of objects. Each object contributes
/// one option built from `id_key` and `name_key`; objects whose id is missing
/// or `null` are dropped. Numeric ids are rendered as strings and a missing
/// label becomes the empty string. Anything other than an array yields no
/// options.
///
/// # Examples
///
/// ```
/// use crm_console::domain::options_from_records;
/// use serde_json::json;
///
/// let options = options_from_records(
///     &json!([{ "province_id": 12, "province_name": "Kandal" }, { "province_name": "?" }]),
///     "province_id",
///     "province_name",
/// );
/// assert_eq!(options.len(), 1);
/// assert_eq!(options[0].value(), "12");
/// ```
pub fn options_from_records(records: &Value, id_key: &str, name_key: &str) -> Vec<SelectOption> {
    let Some(items) = records.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let value = scalar_text(item.get(id_key)?)?;
            let label = item.get(name_key).and_then(scalar_text).unwrap_or_default();
            Some(SelectOption { value, label })
        })
        .collect()
}

/// Find the option carrying `value`, if listed.
pub fn find_option<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    options.iter().find(|option| option.value == value)
}

/// Render a scalar JSON value as text; `null` and containers yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for option equality and record mapping.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn equality_ignores_labels() {
        assert_eq!(SelectOption::new("1", "Phone"), SelectOption::new("1", "Mobile"));
        assert_ne!(SelectOption::new("1", "Phone"), SelectOption::new("2", "Phone"));
    }

    #[rstest]
    fn maps_records_and_drops_rows_without_ids() {
        let records = json!([
            { "channel_type_id": 1, "channel_type_name": "Phone" },
            { "channel_type_id": "2", "channel_type_name": "Email" },
            { "channel_type_id": null, "channel_type_name": "Ghost" },
            { "channel_type_name": "Missing" },
            { "channel_type_id": 3 },
            "not an object",
        ]);

        let options = options_from_records(&records, "channel_type_id", "channel_type_name");

        let pairs: Vec<(&str, &str)> = options
            .iter()
            .map(|option| (option.value(), option.label()))
            .collect();
        assert_eq!(pairs, vec![("1", "Phone"), ("2", "Email"), ("3", "")]);
    }

    #[rstest]
    #[case::object(json!({ "data": [] }))]
    #[case::null(Value::Null)]
    #[case::string(json!("oops"))]
    fn non_array_payloads_yield_no_options(#[case] records: Value) {
        assert!(options_from_records(&records, "id", "name").is_empty());
    }

    #[rstest]
    fn finds_options_by_value() {
        let options = vec![SelectOption::new("1", "Phone"), SelectOption::new("2", "Email")];
        assert_eq!(find_option(&options, "2").map(SelectOption::label), Some("Email"));
        assert!(find_option(&options, "9").is_none());
    }
}
