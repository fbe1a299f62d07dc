//! Listing response envelopes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::PaginationError;

/// One page of rows plus the total number of rows matching the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Rows on this page.
    pub rows: Vec<T>,
    /// Rows matching the search across every page.
    pub total_rows: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total_rows: 0,
        }
    }
}

impl<T> Page<T> {
    /// Number of pages needed for `total_rows` at `page_size` rows per page.
    #[must_use]
    pub fn page_count(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total_rows.div_ceil(u64::from(page_size))
    }

    /// Map every row, keeping the total.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total_rows: self.total_rows,
        }
    }

    /// Map every row, dropping rows the mapper rejects.
    ///
    /// The total is kept as reported by the backend.
    #[must_use]
    pub fn filter_map<U>(self, f: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            rows: self.rows.into_iter().filter_map(f).collect(),
            total_rows: self.total_rows,
        }
    }
}

/// Decode a listing envelope.
///
/// The backend wraps the envelope in a one-element array
/// (`[{"data": [...], "total_row": 12}]`); a bare envelope object is accepted
/// too. An empty array, or an envelope without `data`, decodes to an empty
/// page. `total_row` may arrive as a number or a numeric string.
///
/// # Errors
///
/// Returns [`PaginationError::InvalidEnvelope`] when the body is neither an
/// array nor an object, or when a row cannot be decoded into `T`.
pub fn decode_page<T: DeserializeOwned>(body: Value) -> Result<Page<T>, PaginationError> {
    let envelope = match body {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(Page::default()),
        },
        object @ Value::Object(_) => object,
        other => {
            return Err(PaginationError::InvalidEnvelope {
                message: format!("expected an array or object, found {}", kind(&other)),
            });
        }
    };

    let Value::Object(mut fields) = envelope else {
        return Err(PaginationError::InvalidEnvelope {
            message: "envelope must be a JSON object".to_owned(),
        });
    };

    let total_rows = match fields.remove("total_row") {
        None | Some(Value::Null) => 0,
        Some(value) => parse_total(&value)?,
    };
    let rows = match fields.remove("data") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value).map_err(|error| {
            PaginationError::InvalidEnvelope {
                message: format!("rows did not decode: {error}"),
            }
        })?,
    };

    Ok(Page { rows, total_rows })
}

fn parse_total(value: &Value) -> Result<u64, PaginationError> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| PaginationError::InvalidEnvelope {
        message: format!("total_row must be a non-negative integer, found {value}"),
    })
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
