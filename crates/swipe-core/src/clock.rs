#![forbid(unsafe_code)]

//! Monotonic time sources for gesture timestamps.
//!
//! Every carousel entry point takes `now: Duration` explicitly. Hosts pick
//! where those durations come from: [`MonotonicClock`] reads the platform
//! clock (`performance.now()` on wasm32), tests and replays use a manual
//! clock.

use std::time::Duration;

/// Monotonic time since an unspecified epoch.
pub trait GestureClock {
    /// Elapsed time since the clock's epoch, never decreasing.
    fn now_mono(&self) -> Duration;
}

/// Platform monotonic clock, epoch at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: web_time::Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureClock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}
