//! Defensive coercion of loosely-typed record fields
//!
//! Every helper returns `None` for a missing, null or unparseable field.
//! Numeric fields accept JSON numbers and numeric strings; NaN and infinite
//! values are treated as missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::{RawRecord, Timestamp};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string, assuming UTC when no offset is given
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // "2024-05-05 20:03:12+00:00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn present<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    match record.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

fn value_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Timestamp field
pub fn field_timestamp(record: &RawRecord, key: &str) -> Option<Timestamp> {
    match present(record, key)? {
        Value::String(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Floating point field
pub fn field_f64(record: &RawRecord, key: &str) -> Option<f64> {
    present(record, key).and_then(value_f64)
}

/// Integral field; fractional values are rejected
pub fn field_i64(record: &RawRecord, key: &str) -> Option<i64> {
    let v = field_f64(record, key)?;
    (v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}

/// Non-negative integral field
pub fn field_u32(record: &RawRecord, key: &str) -> Option<u32> {
    field_i64(record, key).and_then(|v| u32::try_from(v).ok())
}

/// Boolean field (accepts bools, 0/1 and "true"/"false")
pub fn field_bool(record: &RawRecord, key: &str) -> Option<bool> {
    match present(record, key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 0.0 => Some(false),
            Some(v) if v == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Text field; numbers are rendered, empty strings are missing
pub fn field_str(record: &RawRecord, key: &str) -> Option<String> {
    match present(record, key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce the first present field of `keys`, in priority order
///
/// Only the first non-null field is considered; if it fails to coerce the
/// result is `None` rather than falling through to the next candidate.
pub fn first_f64(record: &RawRecord, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|k| present(record, k))
        .and_then(value_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 5, 20, 3, 12).unwrap();

        assert_eq!(parse_timestamp("2024-05-05T20:03:12+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-05T22:03:12+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-05T20:03:12Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-05T20:03:12"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-05 20:03:12"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-05 20:03:12+00:00"), Some(expected));

        let fractional = parse_timestamp("2024-05-05T20:03:12.345000+00:00").unwrap();
        assert_eq!(fractional.timestamp(), expected.timestamp());

        assert_eq!(
            parse_timestamp("2024-05-05"),
            Some(Utc.with_ymd_and_hms(2024, 5, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45T99:00:00"), None);

        let rec = record(json!({"date": 12345}));
        assert_eq!(field_timestamp(&rec, "date"), None);
    }

    #[test]
    fn test_numeric_coercion() {
        let rec = record(json!({
            "a": 1.5,
            "b": "2.25",
            "c": "+1 LAP",
            "d": null,
            "e": "NaN",
            "f": 3,
        }));

        assert_eq!(field_f64(&rec, "a"), Some(1.5));
        assert_eq!(field_f64(&rec, "b"), Some(2.25));
        assert_eq!(field_f64(&rec, "c"), None);
        assert_eq!(field_f64(&rec, "d"), None);
        assert_eq!(field_f64(&rec, "e"), None);
        assert_eq!(field_f64(&rec, "missing"), None);

        assert_eq!(field_u32(&rec, "f"), Some(3));
        assert_eq!(field_i64(&rec, "a"), None);
    }

    #[test]
    fn test_bool_coercion() {
        let rec = record(json!({"a": true, "b": 0, "c": "false", "d": "maybe"}));
        assert_eq!(field_bool(&rec, "a"), Some(true));
        assert_eq!(field_bool(&rec, "b"), Some(false));
        assert_eq!(field_bool(&rec, "c"), Some(false));
        assert_eq!(field_bool(&rec, "d"), None);
    }

    #[test]
    fn test_first_f64_priority() {
        let rec = record(json!({"duration": 88.1, "lap_time": 90.0}));
        assert_eq!(first_f64(&rec, &["lap_duration", "duration", "lap_time"]), Some(88.1));

        // First present field wins even when it fails to coerce
        let rec = record(json!({"duration": "n/a", "lap_time": 90.0}));
        assert_eq!(first_f64(&rec, &["duration", "lap_time"]), None);
    }
}
