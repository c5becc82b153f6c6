//! Time related utils.

use crate::{Error, Result};
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Parse time from RFC3339.
///
/// All these examples are valid RFC3339:
///
/// ```text
/// 2022-03-13T07:20:04Z
/// 2022-03-01T08:12:34+00:00
/// 2022-03-01T08:12:34.00+00:00
/// ```
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    Ok(chrono::DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| {
            Error::unexpected(format!("failed to parse rfc3339 time: {s}")).with_source(e)
        })?
        .with_timezone(&Utc))
}

/// Format time into RFC3339 with second precision: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
