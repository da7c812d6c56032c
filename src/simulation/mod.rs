//! Intersection simulation engine
//!
//! Everything needed to step the four-way intersection forward one tick at a
//! time. Signal state is read through an [`IntersectionSource`] so the engine
//! can run against an in-process owner or a remote one alike.

mod accident;
mod approach;
mod cadence;
mod config;
mod intersection;
mod lifecycle;
mod motion;
mod source;
mod spawner;
mod stats;
mod types;
mod vehicle;
mod world;

pub use accident::{
    is_conflict, AccidentDetector, AccidentEvent, AccidentPolicy, ACCIDENT_MESSAGE, CLEAR_MESSAGE,
};
pub use approach::{ApproachProfile, SPAWN_GAP};
pub use cadence::FixedCadence;
pub use config::{SimConfig, SpawnIntervals};
pub use intersection::{
    default_signal_heads, signal_heads_for, IntersectionSnapshot, IntersectionState,
    LaneCounters, SignalHead,
};
pub use lifecycle::{LifecycleManager, Removal, RemovalReason};
pub use motion::{held_by_signal, resolve_motion, MotionReport};
pub use source::{Disconnected, IntersectionSource};
pub use spawner::{place_vehicle, SpawnOutcome, Spawner};
pub use stats::SimulationStats;
pub use types::{
    Approach, Axis, Lane, LightDirection, LightId, Position, Rect, SimBounds, SimId, VehicleId,
    EXTENDED_MARGIN, LANE_WIDTH, MAX_VEHICLES, STOP_DISTANCE, VEHICLE_LENGTH, VEHICLE_SPEED,
    VEHICLE_WIDTH, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
};
pub use vehicle::SimVehicle;
pub use world::{SimWorld, TickReport};
