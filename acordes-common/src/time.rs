//! Timestamp and identifier utilities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Generate a unique, time-ordered identifier (UUIDv7)
///
/// Identifiers created later sort after earlier ones, so comment ids stay
/// monotonic even when two are created within the same millisecond.
pub fn time_ordered_id() -> String {
    Uuid::now_v7().to_string()
}
