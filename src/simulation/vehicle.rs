//! Vehicle state for the intersection simulation

use super::approach::ApproachProfile;
use super::types::{Approach, Axis, Lane, LightDirection, Position, Rect, VehicleId};

/// A vehicle in the intersection simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimVehicle {
    pub id: VehicleId,
    /// Top-left corner of the footprint
    pub position: Position,
    pub axis: Axis,
    pub approach: Approach,
    /// Signed pixels per tick along `axis`
    pub velocity: f32,
    /// Footprint (width, height)
    pub extent: (f32, f32),
    /// Whether the signal let the vehicle advance this tick
    pub moving: bool,
    /// Consecutive ticks the vehicle has stayed in place while its signal was green
    pub stalled_ticks: u32,
    /// Tick the vehicle was created on
    pub spawned_at: u64,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        approach: Approach,
        position: Position,
        speed: f32,
        spawned_at: u64,
    ) -> Self {
        let profile = ApproachProfile::of(approach);
        Self {
            id,
            position,
            axis: profile.axis,
            approach,
            velocity: speed.abs() * profile.sign,
            extent: profile.extent(),
            moving: true,
            stalled_ticks: 0,
            spawned_at,
        }
    }

    pub fn profile(&self) -> &'static ApproachProfile {
        ApproachProfile::of(self.approach)
    }

    /// The signal head governing this vehicle
    pub fn signal(&self) -> LightDirection {
        self.profile().signal
    }

    /// The lane counter this vehicle is attributed to
    pub fn lane(&self) -> Lane {
        self.profile().lane
    }

    pub fn rect(&self) -> Rect {
        self.rect_at(self.position)
    }

    /// Footprint if the vehicle stood at `position`
    pub fn rect_at(&self, position: Position) -> Rect {
        Rect::new(position.x, position.y, self.extent.0, self.extent.1)
    }

    /// Where the vehicle would be after one unobstructed step
    pub fn next_position(&self) -> Position {
        self.position.offset_along(self.axis, self.velocity)
    }

    /// True once the footprint no longer touches `bounds`
    pub fn is_outside(&self, bounds: &Rect) -> bool {
        !self.rect().overlaps(bounds)
    }

    /// True when the vehicle's centre has crossed `center` in its direction of travel
    pub fn is_past(&self, center: &Position) -> bool {
        let here = self.rect().center().along(self.axis);
        (here - center.along(self.axis)) * self.velocity.signum() > 0.0
    }
}
