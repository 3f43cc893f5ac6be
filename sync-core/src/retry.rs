//! Retry schedule for source fetches.
//!
//! Attempts are numbered from 0. A policy with `max_retries = 3` allows four
//! attempts in total; the delay after a failed attempt `n` is
//! `base_delay * 2^n` with no jitter.

use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay between attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1500);

/// Bounded exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with an explicit retry count and base delay.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total number of attempts (`max_retries + 1`).
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether `attempt` is the last one allowed.
    pub fn is_final(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }

    /// Delay to wait after failed attempt `attempt`.
    ///
    /// Formula: base_delay * 2^attempt, saturating instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}
