//! Retry Policy
//!
//! Fixed-count, fixed-delay retries for operations that fail transiently,
//! such as copying a file another process still holds open. The policy only
//! decides; callers schedule the pause themselves so nothing blocks while
//! waiting.

use std::time::Duration;

/// Default number of attempts for a live file sync.
pub const DEFAULT_SYNC_ATTEMPTS: u32 = 10;

/// Default pause between attempts.
pub const DEFAULT_SYNC_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_ATTEMPTS, DEFAULT_SYNC_DELAY)
    }
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Pause before the next attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The attempt (1-based) to make after `failed` failed, if any remain.
    pub fn next_attempt(&self, failed: u32) -> Option<u32> {
        (failed < self.attempts).then_some(failed + 1)
    }
}
