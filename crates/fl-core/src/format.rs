//! Display formatting for timestamps and durations.

use chrono::{DateTime, TimeZone, Timelike};

/// Placeholder shown when a timestamp is outside chrono's representable range.
const UNKNOWN_TIME: &str = "--:--";

/// Formats a timestamp as a 12-hour clock time in the given time zone.
///
/// Minutes are zero-padded, the hour is not, and midnight/noon show as 12:
/// `12:05am`, `9:30am`, `12:00pm`, `11:59pm`.
pub fn format_clock_time_in<Tz: TimeZone>(timestamp: f64, tz: &Tz) -> String {
    let Some(utc) = timestamp_to_datetime(timestamp) else {
        return UNKNOWN_TIME.to_string();
    };
    let local = utc.with_timezone(tz);

    let (is_pm, hour) = local.hour12();
    let suffix = if is_pm { "pm" } else { "am" };
    format!("{hour}:{:02}{suffix}", local.minute())
}

/// Formats a whole number of minutes as `"H hours and M minutes"`.
///
/// Plural forms are used unconditionally (`"1 hours and 1 minutes"`).
/// Negative values are not clamped; both parts carry the sign.
pub fn format_duration(minutes: i64) -> String {
    let hours = minutes / 60;
    let remainder = minutes % 60;
    format!("{hours} hours and {remainder} minutes")
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "out-of-range values are rejected by from_timestamp_millis"
)]
fn timestamp_to_datetime(timestamp: f64) -> Option<DateTime<chrono::Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((timestamp * 1000.0).round() as i64)
}
