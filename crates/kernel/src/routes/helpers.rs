//! Shared route helpers.

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
