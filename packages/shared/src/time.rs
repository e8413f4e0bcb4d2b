//! Time-related utilities with clock abstraction for testability.
//!
//! Chat timestamps travel as integer seconds since the Unix epoch and are
//! only ever rendered as a local time-of-day label.

use chrono::{Local, TimeZone, Utc};

/// Format used for the time-of-day label under each chat entry.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp (seconds)
    fn now_epoch_secs(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        current_epoch_secs()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_secs: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_secs: i64) -> Self {
        Self { fixed_secs }
    }
}

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.fixed_secs
    }
}

/// Get current Unix timestamp (seconds)
pub fn current_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Render a Unix timestamp (seconds) as a local time-of-day label.
///
/// Returns `None` when the value is outside the range chrono can represent
/// or is ambiguous in the local timezone.
pub fn epoch_secs_to_local_time(epoch_secs: i64) -> Option<String> {
    Local
        .timestamp_opt(epoch_secs, 0)
        .single()
        .map(|dt| dt.format(TIME_OF_DAY_FORMAT).to_string())
}
