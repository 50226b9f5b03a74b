//! Wall clock and sleeping.
//!
//! Rate-limit windows are expressed in epoch seconds and every wait in the
//! retry loop blocks the calling thread; both go through [`Clock`] so they
//! can be observed without real waiting.

use std::time::Duration;

pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds.
    fn now_epoch_secs(&self) -> i64;

    /// Block the calling thread.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
