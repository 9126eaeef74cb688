//! Timestamp formatting utilities
//!
//! Event timestamps are written in the ISO 8601 round-trip layout with seven
//! fractional digits (`2024-01-01T00:00:00.0000000Z`). The UTC form carries a
//! `Z` suffix; the local wall-clock form carries no zone designator.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Timelike, Utc};

/// Current time, keeping both the instant and the local offset
pub fn now() -> DateTime<FixedOffset> {
    DateTime::<FixedOffset>::from(Local::now())
}

/// `2024-01-01T10:30:45.1234567Z`
pub fn round_trip_utc(timestamp: &DateTime<FixedOffset>) -> String {
    let utc = timestamp.with_timezone(&Utc).naive_utc();
    format!("{}Z", round_trip(&utc))
}

/// `2024-01-01T11:30:45.1234567` in the timestamp's own offset
pub fn round_trip_local(timestamp: &DateTime<FixedOffset>) -> String {
    round_trip(&timestamp.naive_local())
}

/// `2024-01-01 11:30:45`, used by the debug console
pub fn console(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn round_trip(datetime: &NaiveDateTime) -> String {
    // Leap seconds are reported as nanosecond >= 1_000_000_000
    let ticks = (datetime.nanosecond() % 1_000_000_000) / 100;
    format!("{}.{:07}", datetime.format("%Y-%m-%dT%H:%M:%S"), ticks)
}
