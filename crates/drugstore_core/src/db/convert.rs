//! Column converters between SQLite storage values and domain types.
//!
//! Timestamps are persisted as Unix epoch milliseconds and surfaced as UTC
//! date-times. A missing column value stays missing in both directions.

use chrono::{DateTime, Utc};

/// Converts persisted epoch milliseconds into a UTC timestamp.
///
/// Returns `None` for `None` input and for values outside chrono's range.
pub fn from_epoch_millis(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(DateTime::from_timestamp_millis)
}

/// Converts a timestamp into epoch milliseconds for persistence.
pub fn to_epoch_millis(value: Option<&DateTime<Utc>>) -> Option<i64> {
    value.map(DateTime::timestamp_millis)
}

/// Current time truncated to millisecond precision, so it survives a
/// write/read cycle unchanged.
pub fn now_millis_precision() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
