//! Tick gate: turns a high-frequency host tick into a fixed-rate trigger
//!
//! The host calls back tens of times per second. The gate answers, in O(1)
//! and without allocating, whether enough wall-clock time has passed since
//! the last reapplication pass for another one to run.
//!
//! Timestamps are [`Instant`]s. A timestamp earlier than the last recorded
//! pass (a clock regression) counts as "interval elapsed": the gate fails
//! open rather than freezing reapplication until the clock catches up.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default reapplication interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Interval throttle holding the last pass timestamp
#[derive(Debug, Clone)]
pub struct TickGate {
    interval: Duration,
    last_pass: Instant,
}

impl TickGate {
    /// Create a gate whose first pass is due one interval from `start`
    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last_pass: start,
        }
    }

    /// Create a gate starting now
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Called on every host tick; true when a pass should run
    pub fn on_tick(&mut self, now: Instant) -> bool {
        let due = match now.checked_duration_since(self.last_pass) {
            Some(elapsed) => elapsed >= self.interval,
            None => {
                debug!(
                    regression = ?self.last_pass.duration_since(now),
                    "clock went backwards, running pass"
                );
                true
            }
        };
        if due {
            self.last_pass = now;
        }
        due
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Timestamp of the last pass (or of construction, before the first)
    pub fn last_pass(&self) -> Instant {
        self.last_pass
    }

    /// Time left until the next pass is due, zero if already due
    pub fn remaining(&self, now: Instant) -> Duration {
        now.checked_duration_since(self.last_pass)
            .map(|elapsed| self.interval.saturating_sub(elapsed))
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Source of monotonic timestamps for the host glue
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// The process monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl TimeSource for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for simulations and tests
///
/// Clones share the same current time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Move the clock backward; left unchanged if the platform cannot represent the result
    pub fn rewind(&self, by: Duration) {
        let mut now = self.now.lock();
        if let Some(earlier) = now.checked_sub(by) {
            *now = earlier;
        }
    }

    /// Jump to an arbitrary instant
    pub fn set(&self, to: Instant) {
        *self.now.lock() = to;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
