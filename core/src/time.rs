//! Time related utils.

use crate::{Error, Result};
use chrono::SubsecRound;
use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Current time in UTC, truncated to whole seconds.
///
/// Signing only ever sees second precision, so callers take the value once
/// and thread it through instead of calling this twice.
pub fn now() -> DateTime {
    Utc::now().trunc_subsecs(0)
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse time from RFC3339.
///
/// All these examples are valid RFC3339:
///
/// ```text
/// 2022-03-13T07:20:04Z
/// 2022-03-01T08:12:34+00:00
/// 2022-03-01T08:12:34.123+00:00
/// ```
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|e| {
            Error::unexpected("failed to parse rfc3339 time")
                .with_source(e)
                .with_context(format!("input: {s}"))
        })
}
