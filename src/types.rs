//! Shared date and time helpers used by request/response types

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Wire format for care-log dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO-8601 date or datetime string and return its calendar date.
///
/// Accepts `2025-07-01`, `2025-07-01T09:30:00`, `2025-07-01 09:30:00` and
/// RFC 3339 timestamps with an offset (`2025-07-01T00:00:00Z`). The offset is
/// ignored; the date component is taken as written.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Normalize a date string to `YYYY-MM-DD`.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_calendar_date(raw).map(|d| d.format(DATE_FORMAT).to_string())
}

/// Serde adapter for local times-of-day that accepts `HH:MM` as well as
/// `HH:MM:SS[.fff]`. Serializes as `HH:MM:SS`.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw}")))
    }
}

pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_date_shapes() {
        assert_eq!(normalize_date("2025-07-01").as_deref(), Some("2025-07-01"));
        assert_eq!(normalize_date("2025-07-01T18:30:00").as_deref(), Some("2025-07-01"));
        assert_eq!(normalize_date("2025-07-01 08:00:00").as_deref(), Some("2025-07-01"));
        assert_eq!(normalize_date("2025-07-01T23:00:00+09:00").as_deref(), Some("2025-07-01"));
        assert_eq!(normalize_date(" 2025-07-01 ").as_deref(), Some("2025-07-01"));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(normalize_date("").is_none());
        assert!(normalize_date("07/01/2025").is_none());
        assert!(normalize_date("2025-13-01").is_none());
    }

    #[test]
    fn parses_short_and_long_times() {
        assert_eq!(parse_time_of_day("08:00"), NaiveTime::from_hms_opt(8, 0, 0));
        assert_eq!(parse_time_of_day("18:30:15"), NaiveTime::from_hms_opt(18, 30, 15));
        assert!(parse_time_of_day("25:00").is_none());
    }
}
