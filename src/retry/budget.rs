//! Retry budget for a single call.

/// Counts retries performed by one call against the configured ceiling.
///
/// The first attempt is free: with `max = 2` the loop runs three times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    performed: u32,
    max: u32,
}

impl RetryBudget {
    pub const fn new(max: u32) -> Self {
        Self { performed: 0, max }
    }

    /// Whether another attempt may run.
    pub const fn has_remaining(&self) -> bool {
        self.performed <= self.max
    }

    /// Record a retry after a failed attempt.
    pub fn consume(&mut self) {
        self.performed = self.performed.saturating_add(1);
    }

    pub const fn performed(&self) -> u32 {
        self.performed
    }

    pub const fn max(&self) -> u32 {
        self.max
    }
}
