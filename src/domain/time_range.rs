//! Half-open time interval helpers and day-granularity date text.
//!
//! Ranges are `[start, end)`. Two ranges that merely touch
//! (`end_a == start_b`) do not overlap.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Textual layout used for snapshot dates.
pub const YMD_FORMAT: &str = "%Y-%m-%d";

/// Returns `true` if `[start_a, end_a)` and `[start_b, end_b)` intersect.
///
/// Assumes each range is well-formed (`end > start`) but does not check it.
#[must_use]
pub fn overlapped(
    start_a: DateTime<Utc>,
    end_a: DateTime<Utc>,
    start_b: DateTime<Utc>,
    end_b: DateTime<Utc>,
) -> bool {
    start_a < end_b && start_b < end_a
}

/// Formats an instant as `YYYY-MM-DD`, dropping the time of day.
#[must_use]
pub fn format_ymd(instant: DateTime<Utc>) -> String {
    instant.format(YMD_FORMAT).to_string()
}

/// Parses `YYYY-MM-DD` text into midnight UTC of that day.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] if the text is not a valid calendar date.
pub fn parse_ymd(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let date = NaiveDate::parse_from_str(text.trim(), YMD_FORMAT)?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
