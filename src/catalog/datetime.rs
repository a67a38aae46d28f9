//! Timestamp parsing and canonical formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::CatalogError;

/// Canonical output form: `YYYY-MM-DDTHH:MM:SSZ`.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Accepted input form for [`normalize_datetime`]: fractional seconds and a trailing `Z`.
pub const FRACTIONAL_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Capture-time form with microseconds, as stamped on projected rows.
pub const TIME_OF_CHECK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Naive layouts seen in the catalog's `modified` field, tried in order.
const MODIFIED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Input accepted by [`normalize_datetime`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampInput<'a> {
    Text(&'a str),
    Parsed(DateTime<Utc>),
}

impl<'a> From<&'a str> for TimestampInput<'a> {
    fn from(value: &'a str) -> Self {
        TimestampInput::Text(value)
    }
}

impl<'a> From<&'a String> for TimestampInput<'a> {
    fn from(value: &'a String) -> Self {
        TimestampInput::Text(value.as_str())
    }
}

impl From<DateTime<Utc>> for TimestampInput<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        TimestampInput::Parsed(value)
    }
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SSZ`, truncating fractional seconds.
///
/// Strings must look like `2023-01-05T10:15:30.123456Z`; the fraction is required.
pub fn normalize_datetime<'a>(value: impl Into<TimestampInput<'a>>) -> Result<String, CatalogError> {
    let parsed = match value.into() {
        TimestampInput::Parsed(dt) => dt,
        TimestampInput::Text(text) => Some(text)
            .filter(|t| has_fraction(t))
            .and_then(|t| NaiveDateTime::parse_from_str(t, FRACTIONAL_UTC_FORMAT).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| CatalogError::Format {
                value: text.to_string(),
                expected: FRACTIONAL_UTC_FORMAT,
            })?,
    };
    Ok(parsed.format(CANONICAL_FORMAT).to_string())
}

// chrono's `%.f` also accepts a missing fraction.
fn has_fraction(text: &str) -> bool {
    text.strip_suffix('Z')
        .and_then(|rest| rest.rsplit_once('.'))
        .is_some_and(|(_, digits)| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Best-effort parse of a catalog `modified` value. Offset-less values are UTC.
pub fn parse_modified(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in MODIFIED_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a parsed `modified` value for table output.
pub fn format_modified(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Render a capture time with microsecond precision.
pub fn format_time_of_check(dt: &DateTime<Utc>) -> String {
    dt.format(TIME_OF_CHECK_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_datetime_truncates_micros() {
        assert_eq!(
            normalize_datetime("2023-01-05T10:15:30.123456Z").unwrap(),
            "2023-01-05T10:15:30Z"
        );
    }

    #[test]
    fn test_normalize_datetime_parsed() {
        let dt = Utc.with_ymd_and_hms(2021, 7, 4, 9, 0, 1).unwrap();
        assert_eq!(normalize_datetime(dt).unwrap(), "2021-07-04T09:00:01Z");
    }

    #[test]
    fn test_normalize_datetime_rejects_garbage() {
        let err = normalize_datetime("last tuesday").unwrap_err();
        assert!(matches!(err, CatalogError::Format { .. }));
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn test_normalize_datetime_requires_trailing_z() {
        assert!(normalize_datetime("2023-01-05T10:15:30.123456").is_err());
    }

    #[test]
    fn test_normalize_datetime_requires_fraction() {
        let err = normalize_datetime("2023-01-05T10:15:30Z").unwrap_err();
        assert!(matches!(err, CatalogError::Format { .. }));
        assert!(normalize_datetime("2023-01-05T10:15:30.Z").is_err());
        assert_eq!(
            normalize_datetime("2023-01-05T10:15:30.5Z").unwrap(),
            "2023-01-05T10:15:30Z"
        );
    }

    #[test]
    fn test_parse_modified_catalog_layout() {
        let dt = parse_modified("2020-04-16 00:00:00.0").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 4, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_modified_rfc3339_and_date() {
        let dt = parse_modified("2019-10-22T12:30:00-04:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2019, 10, 22, 16, 30, 0).unwrap());

        let date = parse_modified("2018-03-01").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_modified_unparseable() {
        assert!(parse_modified("").is_none());
        assert!(parse_modified("sometime in 2019").is_none());
    }

    #[test]
    fn test_format_time_of_check_micros() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(format_time_of_check(&dt), "2024-02-03T04:05:06.000000Z");
    }

    #[test]
    fn test_format_modified() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(format_modified(&dt), "2024-02-03T04:05:06Z");
    }
}
