//! Retry policy
//!
//! Fixed-delay retries with rate-limit awareness. The delay between attempts
//! is constant unless the service asks for a specific `retry-after`, and an
//! exhausted rate-limit window is waited out until its reset time.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Statuses the service uses for "too many requests".
pub const RATE_LIMIT_STATUSES: [u16; 2] = [420, 429];

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub retry_count: u32,
    /// Delay between attempts unless the response overrides it.
    #[serde(with = "crate::types::duration_secs")]
    pub retry_delay: Duration,
    /// Statuses worth retrying. Empty means every non-2xx status is retried.
    pub retry_errors: BTreeSet<u16>,
    /// Sleep until the rate-limit window resets instead of failing fast.
    pub wait_on_rate_limit: bool,
    /// Log at warn level whenever a rate-limit wait starts.
    pub wait_on_rate_limit_notify: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 0,
            retry_delay: Duration::ZERO,
            retry_errors: BTreeSet::new(),
            wait_on_rate_limit: false,
            wait_on_rate_limit_notify: true,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_retry_errors<I: IntoIterator<Item = u16>>(mut self, statuses: I) -> Self {
        self.retry_errors = statuses.into_iter().collect();
        self
    }

    pub const fn with_wait_on_rate_limit(mut self, wait: bool) -> Self {
        self.wait_on_rate_limit = wait;
        self
    }

    pub const fn with_wait_on_rate_limit_notify(mut self, notify: bool) -> Self {
        self.wait_on_rate_limit_notify = notify;
        self
    }

    /// Whether the status is handled by rate-limit waiting.
    pub fn is_rate_limit_status(&self, status: u16) -> bool {
        self.wait_on_rate_limit && RATE_LIMIT_STATUSES.contains(&status)
    }

    /// Whether a non-2xx status outside rate-limit handling may be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_errors.is_empty() || self.retry_errors.contains(&status)
    }
}
