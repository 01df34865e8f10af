//! Watchdog (Heartbeat)
//!
//! Ein Druck, der länger als `watchdog_factor * longpress_threshold` aktiv
//! ist, deutet auf eine verpasste Loslass-Flanke hin.

use core::time::Duration;

use crate::config::Timing;
use crate::monitor::ButtonState;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchdog {
    limit: Duration,
}

impl Watchdog {
    pub fn new(timing: &Timing) -> Self {
        Self {
            limit: timing.watchdog_limit(),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// `true` wenn der aktuelle Druck seit mindestens `limit` andauert
    pub fn is_stuck(&self, state: &ButtonState, now: Timestamp) -> bool {
        state
            .press_started_at()
            .is_some_and(|since| now.duration_since(since) >= self.limit)
    }
}
