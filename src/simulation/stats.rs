//! Run statistics for the simulation

use log::info;

use super::lifecycle::{Removal, RemovalReason};
use super::spawner::SpawnOutcome;

/// Counters accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    pub ticks: u64,
    pub total_spawned: u64,
    pub refused_at_capacity: u64,
    pub refused_blocked: u64,
    pub removed_exited: u64,
    pub removed_stalled: u64,
    pub removed_relief: u64,
    pub accidents: u64,
    pub sync_failures: u64,
}

impl SimulationStats {
    pub fn record_spawn(&mut self, outcome: &SpawnOutcome) {
        match outcome {
            SpawnOutcome::Spawned(_) => self.total_spawned += 1,
            SpawnOutcome::AtCapacity => self.refused_at_capacity += 1,
            SpawnOutcome::Blocked => self.refused_blocked += 1,
        }
    }

    pub fn record_removal(&mut self, removal: &Removal) {
        match removal.reason {
            RemovalReason::Exited => self.removed_exited += 1,
            RemovalReason::Stalled => self.removed_stalled += 1,
            RemovalReason::CapacityRelief => self.removed_relief += 1,
        }
    }

    pub fn total_removed(&self) -> u64 {
        self.removed_exited + self.removed_stalled + self.removed_relief
    }

    /// Share of spawned vehicles that left through the far edge
    pub fn exit_rate(&self) -> f32 {
        if self.total_spawned > 0 {
            self.removed_exited as f32 / self.total_spawned as f32 * 100.0
        } else {
            0.0
        }
    }

    /// Log the end-of-run block
    pub fn log_summary(&self, live_vehicles: usize, elapsed_secs: f32) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Ticks: {}", self.ticks);
        info!("Elapsed time: {:.2}s", elapsed_secs);
        info!("Total vehicles spawned: {}", self.total_spawned);
        info!("Spawns refused at capacity: {}", self.refused_at_capacity);
        info!("Spawns refused while blocked: {}", self.refused_blocked);
        info!("Vehicles exited: {}", self.removed_exited);
        info!("Vehicles removed as stalled: {}", self.removed_stalled);
        info!("Vehicles culled for capacity: {}", self.removed_relief);
        info!("Accident events: {}", self.accidents);
        info!("Sync failures: {}", self.sync_failures);
        info!("Active vehicles: {}", live_vehicles);
        info!("Exit rate: {:.1}%", self.exit_rate());
    }
}
