//! Time utility functions
//!
//! Timestamps are persisted as integer milliseconds since the Unix epoch (UTC).

use chrono::{DateTime, Utc};

/// Current time as milliseconds since Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert milliseconds since Unix epoch to DateTime<Utc>
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| {
        tracing::warn!(millis, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

/// Parse an RFC 3339 timestamp into milliseconds since Unix epoch
pub fn parse_rfc3339_millis(ts: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(ts.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}
