//! Fixed-rate pacing for the tick loop

use std::time::{Duration, Instant};

/// Paces ticks at a target rate without catching up
///
/// A tick that overruns its budget simply delays the next one; missed ticks
/// are never replayed.
#[derive(Debug, Clone, Copy)]
pub struct FixedCadence {
    budget: Option<Duration>,
}

impl FixedCadence {
    /// `ticks_per_second == 0` disables pacing
    pub fn new(ticks_per_second: u32) -> Self {
        let budget = (ticks_per_second > 0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(ticks_per_second)));
        Self { budget }
    }

    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    /// How long to wait after a tick that took `elapsed`
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.budget
            .map(|budget| budget.saturating_sub(elapsed))
            .unwrap_or(Duration::ZERO)
    }

    /// Sleep out the rest of the budget for a tick that began at `started`
    pub fn pace(&self, started: Instant) {
        let wait = self.remaining(started.elapsed());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
