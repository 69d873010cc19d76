//! Timestamp conversion between storage and domain representations
//!
//! Dates are persisted as epoch milliseconds so that SQL ordering is numeric.

use chrono::{DateTime, TimeZone, Utc};

/// Current time truncated to millisecond precision
pub fn now() -> DateTime<Utc> {
    truncate(Utc::now())
}

/// Drop the sub-millisecond part, matching what storage keeps
pub fn truncate(time: DateTime<Utc>) -> DateTime<Utc> {
    from_millis(to_millis(&time))
}

/// Convert a stored epoch-millisecond value to a UTC timestamp
///
/// Out-of-range values clamp to the Unix epoch.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
}

/// Convert a UTC timestamp to its stored epoch-millisecond value
pub fn to_millis(time: &DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}
