//! Boundary to whoever owns the authoritative intersection state

use anyhow::Result;

use super::accident::AccidentEvent;
use super::intersection::{IntersectionSnapshot, LaneCounters};

/// Owner of the signal heads and lane counters the engine syncs with
///
/// Called only at tick boundaries. Any error is treated as transient: the
/// engine logs it and carries on with what it already has.
pub trait IntersectionSource {
    /// Current lights and counters
    fn fetch(&mut self) -> Result<IntersectionSnapshot>;

    /// Store the counters after this tick's spawns and removals
    fn publish_counters(&mut self, counters: &LaneCounters) -> Result<()>;

    /// Report a detected accident
    fn record_accident(&mut self, event: &AccidentEvent) -> Result<()>;
}

/// Always-offline source; the engine keeps running on its last snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl IntersectionSource for Disconnected {
    fn fetch(&mut self) -> Result<IntersectionSnapshot> {
        anyhow::bail!("no intersection state owner connected")
    }

    fn publish_counters(&mut self, _counters: &LaneCounters) -> Result<()> {
        anyhow::bail!("no intersection state owner connected")
    }

    fn record_accident(&mut self, _event: &AccidentEvent) -> Result<()> {
        anyhow::bail!("no intersection state owner connected")
    }
}
