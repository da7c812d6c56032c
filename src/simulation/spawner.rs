//! Timed vehicle creation

use std::collections::BTreeMap;

use super::approach::ApproachProfile;
use super::config::{SimConfig, SpawnIntervals};
use super::types::{Approach, VehicleId};
use super::vehicle::SimVehicle;

/// Result of a spawn attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    Spawned(SimVehicle),
    /// Live count already at `max_vehicles`
    AtCapacity,
    /// The entry point is still occupied by an earlier vehicle
    Blocked,
}

/// Per-approach spawn timers
#[derive(Debug, Clone)]
pub struct Spawner {
    intervals: SpawnIntervals,
    timers: BTreeMap<Approach, u32>,
}

impl Spawner {
    pub fn new(intervals: SpawnIntervals) -> Self {
        Self {
            intervals,
            timers: Approach::ALL.iter().map(|a| (*a, 0)).collect(),
        }
    }

    pub fn timer(&self, approach: Approach) -> u32 {
        self.timers.get(&approach).copied().unwrap_or(0)
    }

    /// Advance every timer by one tick
    ///
    /// Returns the approaches whose interval elapsed; their timers are reset
    /// whether or not the caller manages to create a vehicle.
    pub fn advance(&mut self) -> Vec<Approach> {
        let mut due = Vec::new();
        for (approach, timer) in self.timers.iter_mut() {
            *timer += 1;
            if *timer >= self.intervals.get(*approach) {
                *timer = 0;
                due.push(*approach);
            }
        }
        due
    }
}

/// Build a vehicle for `approach` on lane `lane_index`, if there is room
///
/// `vehicles` must already contain everything created earlier in the same
/// tick so that the capacity cap and the entry check see them.
pub fn place_vehicle(
    id: VehicleId,
    approach: Approach,
    lane_index: usize,
    vehicles: &BTreeMap<VehicleId, SimVehicle>,
    config: &SimConfig,
    tick: u64,
) -> SpawnOutcome {
    if vehicles.len() >= config.max_vehicles {
        return SpawnOutcome::AtCapacity;
    }

    let position = ApproachProfile::of(approach).spawn_position(&config.bounds(), lane_index);
    let vehicle = SimVehicle::new(id, approach, position, config.vehicle_speed, tick);
    let footprint = vehicle.rect();

    if vehicles.values().any(|other| other.rect().overlaps(&footprint)) {
        return SpawnOutcome::Blocked;
    }

    SpawnOutcome::Spawned(vehicle)
}
