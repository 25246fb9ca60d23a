//! Time gate: decides whether a batch is processed at all.
//!
//! Local time is computed in a fixed UTC+5:30 zone. Outside the configured
//! window the whole batch is bypassed.

use chrono::{DateTime, Timelike, Utc};

use crate::config::ActiveWindow;

/// Offset of the local zone from UTC, in minutes (UTC+5:30).
pub const LOCAL_OFFSET_MINUTES: u32 = 330;

const MINUTES_PER_DAY: u32 = 1440;

impl ActiveWindow {
    /// Whether a local minute-of-day falls inside the window (both ends inclusive).
    pub fn contains(&self, minutes: u16) -> bool {
        self.start() <= minutes && minutes <= self.end()
    }
}

/// Local wall-clock minutes since midnight for a UTC instant. Seconds are ignored.
pub fn local_minutes(now: DateTime<Utc>) -> u16 {
    let utc_minutes = now.hour() * 60 + now.minute();
    // Always < 1440, fits in u16
    ((utc_minutes + LOCAL_OFFSET_MINUTES) % MINUTES_PER_DAY) as u16
}

/// Whether alerts may fire at `now`.
pub fn is_active(now: DateTime<Utc>, window: &ActiveWindow) -> bool {
    window.contains(local_minutes(now))
}

/// Render minutes since midnight as `HH:MM`.
pub fn format_hm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
