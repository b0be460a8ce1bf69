//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render a timestamp as a filename-safe suffix.
///
/// ISO 8601 with millisecond precision, with `:` and `.` replaced by `-`
/// (e.g. `2025-10-26T14-30-45-123Z`).
pub fn file_suffix(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}
