//! Retry policy for background jobs

use std::time::Duration;

use booking_chat_common::WorkerConfig;

use crate::services::ServiceError;

/// What to do with a job after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    /// Dead-letter; `exhausted` is false for errors that are never retried
    GiveUp { exhausted: bool },
}

/// Bounded attempts with a fixed backoff schedule
///
/// After failed attempt `n` the job waits `backoff[n - 1]`; attempts past the
/// end of the schedule reuse its last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    pub const DEFAULT_BACKOFF_SECS: [u64; 5] = [5, 30, 60, 120, 300];

    pub fn new(max_attempts: u32, backoff: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(
            config.max_attempts,
            config
                .backoff_secs
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt after `failed_attempt` (1-based), if any
    pub fn next_delay(&self, failed_attempt: u32) -> Option<Duration> {
        if failed_attempt >= self.max_attempts {
            return None;
        }
        let index = failed_attempt.saturating_sub(1) as usize;
        Some(
            self.backoff
                .get(index)
                .or_else(|| self.backoff.last())
                .copied()
                .unwrap_or_default(),
        )
    }

    pub fn decide(&self, failed_attempt: u32, err: &ServiceError) -> RetryDecision {
        if !err.is_transient() {
            return RetryDecision::GiveUp { exhausted: false };
        }
        match self.next_delay(failed_attempt) {
            Some(delay) => RetryDecision::RetryAfter(delay),
            None => RetryDecision::GiveUp { exhausted: true },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            5,
            Self::DEFAULT_BACKOFF_SECS
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
        )
    }
}
