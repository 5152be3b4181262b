//! Wire format for check-in timestamps.
//!
//! The remote API emits ISO 8601 strings, sometimes without an offset. Naive
//! values are read as UTC. Output always uses RFC 3339 with millisecond
//! precision and a `Z` suffix.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Render a timestamp the way the remote API expects it.
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 or naive ISO 8601 timestamp.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// `serde(with = ...)` adapter for nullable timestamps.
///
/// Unreadable values are logged and read as absent, so one odd record does
/// not reject a whole roster.
pub mod option {
    use super::{format, parse, DateTime, Deserialize, Deserializer, Serializer, Utc};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => {
                let parsed = parse(&raw);
                if parsed.is_none() {
                    tracing::warn!("Ignoring unreadable timestamp '{}'", raw);
                }
                Ok(parsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_matches_iso_string_shape() {
        let value = Utc.with_ymd_and_hms(2025, 3, 9, 18, 4, 5).unwrap();
        assert_eq!(format(&value), "2025-03-09T18:04:05.000Z");
    }

    #[test]
    fn parse_accepts_offsets_and_naive_values() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 9, 18, 4, 5).unwrap();
        assert_eq!(parse("2025-03-09T18:04:05Z"), Some(expected));
        assert_eq!(parse("2025-03-09T11:04:05-07:00"), Some(expected));
        assert_eq!(parse("2025-03-09T18:04:05"), Some(expected));
        assert_eq!(parse("2025-03-09 18:04:05.000"), Some(expected));
        assert_eq!(parse("yesterday"), None);
    }

    #[derive(Debug, serde::Deserialize)]
    struct Stamped {
        #[serde(default, with = "option")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn option_reads_blank_and_unreadable_values_as_absent() {
        let read = |json: &str| serde_json::from_str::<Stamped>(json).unwrap().at;
        assert_eq!(read(r#"{"at": ""}"#), None);
        assert_eq!(read(r#"{"at": null}"#), None);
        assert_eq!(read(r#"{"at": "4/12/2025 9:00:00 AM"}"#), None);
        assert_eq!(
            read(r#"{"at": "2025-04-12T09:00:00Z"}"#),
            Some(Utc.with_ymd_and_hms(2025, 4, 12, 9, 0, 0).unwrap())
        );
    }
}
