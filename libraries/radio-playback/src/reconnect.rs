//! Reconnection backoff policy
//!
//! delay = min(base × 2^attempts, max). Each scheduled retry bumps the
//! attempt counter; reaching Playing resets it.

use std::time::Duration;

/// Delay before the first retry
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for any retry delay
pub const MAX_DELAY: Duration = Duration::from_millis(30_000);

/// Exponential backoff with a cap
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
    base: Duration,
    max: Duration,
}

impl ReconnectPolicy {
    /// Policy with the standard 1 s base and 30 s cap
    pub fn new() -> Self {
        Self::with_bounds(BASE_DELAY, MAX_DELAY)
    }

    /// Policy with custom bounds
    pub fn with_bounds(base: Duration, max: Duration) -> Self {
        Self {
            attempts: 0,
            base,
            max,
        }
    }

    /// Delay for a given number of previous attempts
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let base_ms = self.base.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        let factor = 1u64.checked_shl(attempts).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(factor).min(max_ms))
    }

    /// Delay for the next retry; counts the attempt
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.delay_for(self.attempts);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Number of retries scheduled since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Back to zero attempts
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}
