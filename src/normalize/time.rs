//! Timestamp parsing shared by the equity and AI log normalizers

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Absolute epoch values below this are taken as seconds, above as milliseconds.
/// 1e11 seconds is year 5138; 1e11 ms is early 1973.
const SECONDS_CUTOFF: f64 = 1e11;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Convert a JSON number or string into epoch milliseconds.
pub fn timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(epoch_number_to_ms),
        Value::String(s) => parse_time_str(s),
        _ => None,
    }
}

/// Parse a textual time into epoch milliseconds.
///
/// Accepts numeric epochs (seconds or milliseconds), RFC 3339, RFC 2822, and
/// zone-less `YYYY-MM-DD HH:MM[:SS[.f]]` forms which are read as UTC.
pub fn parse_time_str(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(n) = s.parse::<f64>() {
        return epoch_number_to_ms(n);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

fn epoch_number_to_ms(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    let ms = if n.abs() < SECONDS_CUTOFF { n * 1000.0 } else { n };
    let ms = ms.round();
    // Outside what chrono can represent
    let min = DateTime::<Utc>::MIN_UTC.timestamp_millis() as f64;
    let max = DateTime::<Utc>::MAX_UTC.timestamp_millis() as f64;
    if ms < min || ms > max {
        return None;
    }
    Some(ms as i64)
}
