//! Main simulation world that ties everything together
//!
//! One call to [`SimWorld::tick`] is one discrete step: sync with the state
//! owner, spawn, move, sweep, detect accidents, publish counters.

use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::accident::{AccidentDetector, AccidentEvent};
use super::approach::ApproachProfile;
use super::config::SimConfig;
use super::intersection::{signal_heads_for, IntersectionSnapshot, LaneCounters};
use super::lifecycle::{LifecycleManager, Removal};
use super::motion::{resolve_motion, MotionReport};
use super::source::IntersectionSource;
use super::spawner::{place_vehicle, SpawnOutcome, Spawner};
use super::stats::SimulationStats;
use super::types::{Approach, Position, SimBounds, SimId, VehicleId};
use super::vehicle::SimVehicle;

/// Everything that happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Whether fresh state was fetched at the start of the tick
    pub synced: bool,
    pub spawned: Vec<VehicleId>,
    pub motion: MotionReport,
    pub removals: Vec<Removal>,
    pub accident: Option<AccidentEvent>,
}

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// All live vehicles, oldest first
    pub vehicles: BTreeMap<VehicleId, SimVehicle>,

    /// Lights and counters as fetched at the start of the current tick
    snapshot: IntersectionSnapshot,

    /// Working copy of the lane counters, published at the end of a tick
    counters: LaneCounters,

    /// Local counter changes the owner has not accepted yet
    unpublished: bool,

    spawner: Spawner,
    lifecycle: LifecycleManager,
    detector: AccidentDetector,
    bounds: SimBounds,

    /// Next ID to assign
    next_id: usize,

    /// Ticks run so far
    pub tick_count: u64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    pub stats: SimulationStats,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: Option<StdRng>) -> Self {
        let snapshot = IntersectionSnapshot {
            lights: signal_heads_for(config.viewport_width, config.viewport_height),
            counters: LaneCounters::default(),
        };
        Self {
            spawner: Spawner::new(config.spawn_intervals),
            lifecycle: LifecycleManager::new(&config),
            detector: AccidentDetector::new(config.accident_policy),
            bounds: config.bounds(),
            config,
            vehicles: BTreeMap::new(),
            snapshot,
            counters: LaneCounters::default(),
            unpublished: false,
            next_id: 0,
            tick_count: 0,
            rng,
            stats: SimulationStats::default(),
        }
    }

    pub fn new(config: SimConfig) -> Self {
        Self::new_internal(config, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(config: SimConfig, seed: u64) -> Self {
        Self::new_internal(config, Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random lane index, using seeded RNG if available
    fn random_lane(&mut self, lanes: usize) -> usize {
        match &mut self.rng {
            Some(rng) => rng.random_range(0..lanes),
            None => rand::rng().random_range(0..lanes),
        }
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(SimId(self.next_id));
        self.next_id += 1;
        id
    }

    pub fn snapshot(&self) -> &IntersectionSnapshot {
        &self.snapshot
    }

    pub fn counters(&self) -> LaneCounters {
        self.counters
    }

    pub fn bounds(&self) -> &SimBounds {
        &self.bounds
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn live_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Try to create a vehicle on `approach`, lane `lane_index`
    ///
    /// Refusals (capacity, occupied entry) are silent no-ops.
    pub fn spawn_vehicle(&mut self, approach: Approach, lane_index: usize) -> SpawnOutcome {
        let id = VehicleId(SimId(self.next_id));
        let outcome = place_vehicle(
            id,
            approach,
            lane_index,
            &self.vehicles,
            &self.config,
            self.tick_count,
        );
        self.stats.record_spawn(&outcome);

        if let SpawnOutcome::Spawned(vehicle) = &outcome {
            self.next_id += 1;
            self.counters.increment(vehicle.lane());
            self.unpublished = true;
            debug!(
                "Spawned vehicle {:?} on {} lane {} at ({:.0}, {:.0})",
                id.0,
                approach.as_str(),
                lane_index,
                vehicle.position.x,
                vehicle.position.y
            );
            self.vehicles.insert(id, vehicle.clone());
        }
        outcome
    }

    /// Place a vehicle at an arbitrary position, bypassing the spawn rules
    ///
    /// The lane counter is still incremented so removals stay balanced.
    pub fn add_vehicle_at(&mut self, approach: Approach, position: Position) -> VehicleId {
        let id = self.next_vehicle_id();
        let vehicle = SimVehicle::new(
            id,
            approach,
            position,
            self.config.vehicle_speed,
            self.tick_count,
        );
        self.counters.increment(vehicle.lane());
        self.unpublished = true;
        self.vehicles.insert(id, vehicle);
        id
    }

    /// Run one simulation step against `source`
    pub fn tick(&mut self, source: &mut dyn IntersectionSource) -> TickReport {
        self.tick_count += 1;
        self.stats.ticks += 1;

        // Changes from outside the tick loop, or a failed publish, go out first
        if self.unpublished {
            self.publish_counters(source);
        }
        let synced = self.sync_from(source);
        let counters_before = self.counters;

        let spawned = self.spawn_due();

        let motion = resolve_motion(&mut self.vehicles, &self.snapshot, self.config.stop_distance);

        let removals = if self.lifecycle.is_due(self.tick_count) {
            self.lifecycle.sweep(
                &mut self.vehicles,
                &mut self.counters,
                &self.snapshot,
                &self.bounds,
            )
        } else {
            Vec::new()
        };
        for removal in &removals {
            self.stats.record_removal(removal);
        }

        let accident = self.detector.observe(&self.snapshot.lights, Utc::now());
        if let Some(event) = &accident {
            self.stats.accidents += 1;
            warn!("{} (tick {})", event.message, self.tick_count);
            if let Err(e) = source.record_accident(event) {
                warn!("Failed to report accident: {:#}", e);
            }
        }

        if self.counters != counters_before {
            self.unpublished = true;
        }
        if self.unpublished {
            self.snapshot.counters = self.counters;
            self.publish_counters(source);
        }

        TickReport {
            synced,
            spawned,
            motion,
            removals,
            accident,
        }
    }

    /// Refresh the snapshot, keeping the previous one if the owner is unreachable
    fn sync_from(&mut self, source: &mut dyn IntersectionSource) -> bool {
        match source.fetch() {
            Ok(snapshot) => {
                // Local changes still waiting to go out win over the owner's copy
                if !self.unpublished {
                    self.counters = snapshot.counters;
                }
                self.snapshot = snapshot;
                self.snapshot.counters = self.counters;
                true
            }
            Err(e) => {
                self.stats.sync_failures += 1;
                warn!(
                    "Failed to fetch intersection state, reusing previous snapshot: {:#}",
                    e
                );
                false
            }
        }
    }

    fn publish_counters(&mut self, source: &mut dyn IntersectionSource) {
        match source.publish_counters(&self.counters) {
            Ok(()) => self.unpublished = false,
            Err(e) => {
                self.stats.sync_failures += 1;
                warn!("Failed to publish lane counters: {:#}", e);
            }
        }
    }

    fn spawn_due(&mut self) -> Vec<VehicleId> {
        let mut spawned = Vec::new();
        for approach in self.spawner.advance() {
            let lanes = ApproachProfile::of(approach).lane_offsets.len();
            let lane_index = self.random_lane(lanes);
            if let SpawnOutcome::Spawned(vehicle) = self.spawn_vehicle(approach, lane_index) {
                spawned.push(vehicle.id);
            }
        }
        spawned
    }

    /// Log a one-line view of the world
    pub fn log_summary(&self) {
        let per_approach: Vec<String> = Approach::ALL
            .iter()
            .map(|approach| {
                let count = self
                    .vehicles
                    .values()
                    .filter(|v| v.approach == *approach)
                    .count();
                format!("{}={}", approach.as_str(), count)
            })
            .collect();
        let lights: Vec<String> = self
            .snapshot
            .lights
            .iter()
            .map(|l| {
                let lamp = if l.green {
                    "G"
                } else if l.yellow {
                    "Y"
                } else if l.red {
                    "R"
                } else {
                    "-"
                };
                format!("{:?}:{}", l.direction, lamp)
            })
            .collect();

        info!(
            "tick {} | vehicles {} [{}] | lights [{}] | counters {:?}",
            self.tick_count,
            self.vehicles.len(),
            per_approach.join(" "),
            lights.join(" "),
            self.counters
        );
    }
}
