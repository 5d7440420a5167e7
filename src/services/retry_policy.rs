use std::time::Duration;

use crate::domain::errors::ExpansionError;
use crate::domain::models::GenerationConfig;

/// Bounded retry policy with exponential backoff
///
/// Delay before retry `n` (0-based) is `min(initial * 2^n, max)`:
/// with the defaults that is 1s → 2s → 4s → 8s → 8s.
///
/// # Retry Decision
/// - Retry on: network errors (including non-success statuses), timeouts,
///   malformed responses
/// - Do NOT retry: anything else, or once `max_retries` retries have been spent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    max_retries: u32,
    /// Initial backoff delay in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub const fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether to retry after `err`, given `retries_so_far` retries already made
    pub const fn should_retry(&self, err: &ExpansionError, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries && err.is_retryable()
    }

    /// Delay to wait before retry number `retry` (0-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }
}
