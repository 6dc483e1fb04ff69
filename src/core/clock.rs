//! Simulation clock and interval gating
//!
//! Subsystems that run coarser than every tick (social pass, market drift,
//! aggregator) accumulate elapsed time in an [`IntervalGate`] and fire once the
//! accumulated time reaches their interval. This works the same for fixed and
//! variable `dt`.

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Elapsed simulation time
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimClock {
    pub tick: Tick,
    pub elapsed: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.elapsed += dt as f64;
    }
}

/// Fires at most once per `interval` of accumulated time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalGate {
    interval: f32,
    accumulated: f32,
}

impl IntervalGate {
    /// A gate that waits a full interval before firing the first time
    pub fn new(interval: f32) -> Self {
        Self { interval, accumulated: 0.0 }
    }

    /// A gate that fires on the first call
    pub fn primed(interval: f32) -> Self {
        Self { interval, accumulated: interval }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Accumulate `dt` and report whether the interval has elapsed
    ///
    /// Carries over the remainder so long runs do not drift. A single call
    /// fires at most once even when `dt` spans several intervals.
    pub fn ready(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        if self.accumulated >= self.interval {
            self.accumulated = (self.accumulated - self.interval).min(self.interval);
            true
        } else {
            false
        }
    }

    /// Start waiting a full interval again
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}
