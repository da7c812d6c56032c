//! Vehicle removal and lane counter reconciliation

use log::debug;
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

use super::config::SimConfig;
use super::intersection::{IntersectionSnapshot, LaneCounters};
use super::types::{Lane, SimBounds, VehicleId};
use super::vehicle::SimVehicle;

/// Why a vehicle was taken out of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// Left the extended bound
    Exited,
    /// Stuck under a green signal for too long
    Stalled,
    /// Culled off-screen to free capacity
    CapacityRelief,
}

/// A vehicle removed by a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub id: VehicleId,
    pub lane: Lane,
    pub reason: RemovalReason,
}

/// Removes vehicles that exited, stalled, or must make room for new ones
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    interval: u32,
    stall_ticks: u32,
    high_water: usize,
}

impl LifecycleManager {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            interval: config.lifecycle_interval.max(1),
            stall_ticks: config.stall_ticks,
            high_water: config.high_water_mark(),
        }
    }

    /// Whether a sweep should run on `tick`
    pub fn is_due(&self, tick: u64) -> bool {
        tick % u64::from(self.interval) == 0
    }

    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Run every removal rule once
    ///
    /// A vehicle matched by several rules is removed, and its lane counter
    /// decremented, exactly once; the first matching rule is reported.
    pub fn sweep(
        &self,
        vehicles: &mut BTreeMap<VehicleId, SimVehicle>,
        counters: &mut LaneCounters,
        snapshot: &IntersectionSnapshot,
        bounds: &SimBounds,
    ) -> Vec<Removal> {
        let mut marked: BTreeMap<VehicleId, RemovalReason> = BTreeMap::new();

        for vehicle in vehicles.values() {
            if vehicle.is_outside(&bounds.extended) {
                marked.insert(vehicle.id, RemovalReason::Exited);
            }
        }

        for vehicle in vehicles.values() {
            // A vehicle that advanced this tick has a zero count and never qualifies
            let stalled = vehicle.stalled_ticks > 0 && vehicle.stalled_ticks >= self.stall_ticks;
            if stalled && snapshot.is_green(vehicle.signal()) {
                marked.entry(vehicle.id).or_insert(RemovalReason::Stalled);
            }
        }

        self.mark_for_relief(vehicles, bounds, &mut marked);

        let mut removals = Vec::with_capacity(marked.len());
        for (id, reason) in marked {
            if let Some(vehicle) = vehicles.remove(&id) {
                let lane = vehicle.lane();
                counters.decrement(lane);
                debug!("Removed vehicle {:?} ({:?}) from {:?} lane", id.0, reason, lane);
                removals.push(Removal { id, lane, reason });
            }
        }
        removals
    }

    /// Cull off-screen vehicles that are heading away, farthest first,
    /// until the live count drops below the high-water mark
    fn mark_for_relief(
        &self,
        vehicles: &BTreeMap<VehicleId, SimVehicle>,
        bounds: &SimBounds,
        marked: &mut BTreeMap<VehicleId, RemovalReason>,
    ) {
        let mut live = vehicles.len().saturating_sub(marked.len());
        if live < self.high_water {
            return;
        }

        let center = bounds.center();
        let mut candidates: Vec<(OrderedFloat<f32>, VehicleId)> = vehicles
            .values()
            .filter(|v| !marked.contains_key(&v.id))
            .filter(|v| v.is_outside(&bounds.viewport) && v.is_past(&center))
            .map(|v| (OrderedFloat(v.rect().center().distance(&center)), v.id))
            .collect();

        // Farthest first, then oldest
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        for (_, id) in candidates {
            if live < self.high_water {
                break;
            }
            marked.insert(id, RemovalReason::CapacityRelief);
            live -= 1;
        }
    }
}
