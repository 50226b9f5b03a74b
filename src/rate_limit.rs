//! Rate-limit bookkeeping.
//!
//! The remote service reports its quota through response headers. One
//! [`RateLimitState`] lives inside each bound method and is updated only
//! after a non-2xx attempt; it is never shared between methods, so parallel
//! callers rediscover the same window independently.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::HeaderMap;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";
pub const RETRY_AFTER_HEADER: &str = "retry-after";

/// Error code the service uses for "rate limit exceeded".
pub const RATE_LIMIT_ERROR_CODE: i64 = 88;

/// Extra second added to reset waits to absorb clock skew.
const RESET_SKEW: Duration = Duration::from_secs(1);

static RATE_LIMIT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\brate[ _-]?limit(ed)?\b.*\bexceeded\b|\btoo many requests\b")
        .expect("rate limit pattern is valid")
});

/// Last known quota of the remote window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// Calls left in the current window.
    pub remaining: Option<i64>,
    /// Unix time (seconds) at which the window resets.
    pub reset: Option<i64>,
}

impl RateLimitState {
    pub const fn new() -> Self {
        Self {
            remaining: None,
            reset: None,
        }
    }

    pub const fn is_exhausted(&self) -> bool {
        matches!(self.remaining, Some(remaining) if remaining < 1)
    }

    /// How long to wait before the next send, if the window is known to be
    /// exhausted and has not reset yet.
    pub fn wait_before_send(&self, now_epoch_secs: i64) -> Option<Duration> {
        let (Some(reset), Some(remaining)) = (self.reset, self.remaining) else {
            return None;
        };
        if remaining >= 1 {
            return None;
        }
        let secs = reset - now_epoch_secs;
        if secs <= 0 {
            return None;
        }
        Some(Duration::from_secs(secs as u64) + RESET_SKEW)
    }

    /// Fold the headers of a failed attempt into the state.
    ///
    /// Without a remaining-count header the previous count is decremented
    /// by one; this is an estimate, not something the service guarantees.
    pub fn update(&mut self, headers: &HeaderMap) {
        match header_i64(headers, RATE_LIMIT_REMAINING_HEADER) {
            Some(remaining) => self.remaining = Some(remaining),
            None => {
                if let Some(previous) = self.remaining {
                    self.remaining = Some(previous - 1);
                }
            }
        }
        if let Some(reset) = header_i64(headers, RATE_LIMIT_RESET_HEADER) {
            self.reset = Some(reset);
        }
    }
}

/// `retry-after` expressed in seconds (fractions allowed).
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER_HEADER)?.to_str().ok()?.trim();
    let secs = raw.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Whether an error message/code pair reports an exhausted rate limit.
pub fn is_rate_limit_error(message: &str, code: Option<i64>) -> bool {
    code == Some(RATE_LIMIT_ERROR_CODE) || RATE_LIMIT_MESSAGE.is_match(message)
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}
