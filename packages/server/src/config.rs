//! Hub configuration.

use std::time::Duration;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub const fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Tuning knobs of the connection hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Messages that may wait between the sessions and the dispatcher
    pub pipeline_capacity: usize,
    /// Live frames buffered per session before it is evicted as too slow
    pub outbox_capacity: usize,
    /// Upper bound on a single write to a session's transport
    pub write_timeout: Duration,
    /// How the dispatcher retries a failed append
    pub persist_retry: RetryPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            pipeline_capacity: 1,
            outbox_capacity: 256,
            write_timeout: Duration::from_secs(5),
            persist_retry: RetryPolicy::default(),
        }
    }
}
