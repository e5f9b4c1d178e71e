//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, FixedOffset, Local};

/// Display pattern for message receipt times, e.g. `2023-01-01 3:4:5 pm`.
///
/// Hours are on a 12-hour clock; hour, minute and second are not zero-padded.
pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %-I:%-M:%-S %P";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current time in the server's local offset
    fn now(&self) -> DateTime<FixedOffset>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<FixedOffset>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    pub fn new(fixed_time: DateTime<FixedOffset>) -> Self {
        Self { fixed_time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.fixed_time
    }
}

/// Format a time with [`MESSAGE_TIME_FORMAT`]
pub fn format_message_time(time: &DateTime<FixedOffset>) -> String {
    time.format(MESSAGE_TIME_FORMAT).to_string()
}

/// Current time of `clock`, formatted for a message's `time` field
pub fn message_time_now(clock: &dyn Clock) -> String {
    format_message_time(&clock.now())
}
