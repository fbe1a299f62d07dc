//! Calendar dates as exchanged with the backend.

use chrono::{DateTime, NaiveDate};

const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a backend date.
///
/// Accepts plain `YYYY-MM-DD` dates and RFC 3339 timestamps, keeping the
/// calendar date as written. Blank or malformed input yields `None`.
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, API_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, API_DATE_FORMAT).ok())
        })
}

/// Render a date the way the backend expects it (`YYYY-MM-DD`).
pub fn format_api_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|value| value.format(API_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    //! Date parsing coverage.

    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day)
    }

    #[rstest]
    #[case::plain("1990-04-17", date(1990, 4, 17))]
    #[case::rfc3339("1990-04-17T00:00:00.000Z", date(1990, 4, 17))]
    #[case::offset("1990-04-17T23:30:00+07:00", date(1990, 4, 17))]
    #[case::sql_timestamp("1990-04-17 08:00:00", date(1990, 4, 17))]
    #[case::blank("  ", None)]
    #[case::garbage("yesterday", None)]
    fn parses_backend_dates(#[case] raw: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_api_date(raw), expected);
    }

    #[rstest]
    fn formats_with_zero_padding() {
        assert_eq!(format_api_date(date(2024, 1, 5)), Some("2024-01-05".to_owned()));
        assert_eq!(format_api_date(None), None);
    }
}
