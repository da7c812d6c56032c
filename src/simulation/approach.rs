//! Per-approach geometry table
//!
//! Everything that differs between the four directions of travel lives in
//! one table row instead of being branched on at each use site.

use super::types::{
    Approach, Axis, Lane, LightDirection, Position, Rect, SimBounds, LANE_WIDTH, VEHICLE_LENGTH,
    VEHICLE_WIDTH,
};

/// Gap between the viewport edge and the leading edge of a fresh vehicle
pub const SPAWN_GAP: f32 = 10.0;

/// Static description of one approach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproachProfile {
    pub approach: Approach,
    pub axis: Axis,
    /// +1.0 when travelling towards larger coordinates, -1.0 otherwise
    pub sign: f32,
    /// Signal head that governs this approach
    pub signal: LightDirection,
    /// Lane counter this approach is attributed to
    pub lane: Lane,
    /// Lane centre offsets from the intersection centre, across the axis
    pub lane_offsets: [f32; 2],
}

const NEAR: f32 = LANE_WIDTH / 2.0;
const FAR: f32 = LANE_WIDTH + LANE_WIDTH / 2.0;

const PROFILES: [ApproachProfile; 4] = [
    ApproachProfile {
        approach: Approach::UpDown,
        axis: Axis::Vertical,
        sign: 1.0,
        signal: LightDirection::Up,
        lane: Lane::Top,
        lane_offsets: [-FAR, -NEAR],
    },
    ApproachProfile {
        approach: Approach::DownUp,
        axis: Axis::Vertical,
        sign: -1.0,
        signal: LightDirection::Down,
        lane: Lane::Bottom,
        lane_offsets: [NEAR, FAR],
    },
    ApproachProfile {
        approach: Approach::LeftRight,
        axis: Axis::Horizontal,
        sign: 1.0,
        signal: LightDirection::Left,
        lane: Lane::Left,
        lane_offsets: [NEAR, FAR],
    },
    ApproachProfile {
        approach: Approach::RightLeft,
        axis: Axis::Horizontal,
        sign: -1.0,
        signal: LightDirection::Right,
        lane: Lane::Right,
        lane_offsets: [-FAR, -NEAR],
    },
];

impl ApproachProfile {
    pub fn of(approach: Approach) -> &'static ApproachProfile {
        match approach {
            Approach::UpDown => &PROFILES[0],
            Approach::DownUp => &PROFILES[1],
            Approach::LeftRight => &PROFILES[2],
            Approach::RightLeft => &PROFILES[3],
        }
    }

    /// Footprint (width, height) of a vehicle on this approach
    pub fn extent(&self) -> (f32, f32) {
        match self.axis {
            Axis::Horizontal => (VEHICLE_LENGTH, VEHICLE_WIDTH),
            Axis::Vertical => (VEHICLE_WIDTH, VEHICLE_LENGTH),
        }
    }

    /// Top-left corner for a vehicle entering on lane `lane_index`
    ///
    /// The vehicle sits just outside the viewport on the entry edge, well
    /// inside the extended bound.
    pub fn spawn_position(&self, bounds: &SimBounds, lane_index: usize) -> Position {
        let center = bounds.center();
        let offset = self.lane_offsets[lane_index % self.lane_offsets.len()];
        let viewport = bounds.viewport;

        match self.axis {
            Axis::Vertical => {
                let x = center.x + offset - VEHICLE_WIDTH / 2.0;
                let y = if self.sign > 0.0 {
                    viewport.top() - SPAWN_GAP - VEHICLE_LENGTH
                } else {
                    viewport.bottom() + SPAWN_GAP
                };
                Position::new(x, y)
            }
            Axis::Horizontal => {
                let y = center.y + offset - VEHICLE_WIDTH / 2.0;
                let x = if self.sign > 0.0 {
                    viewport.left() - SPAWN_GAP - VEHICLE_LENGTH
                } else {
                    viewport.right() + SPAWN_GAP
                };
                Position::new(x, y)
            }
        }
    }

    /// Edge of `rect` facing the direction of travel, as an axis coordinate
    pub fn leading_edge(&self, rect: &Rect) -> f32 {
        match (self.axis, self.sign > 0.0) {
            (Axis::Horizontal, true) => rect.right(),
            (Axis::Horizontal, false) => rect.left(),
            (Axis::Vertical, true) => rect.bottom(),
            (Axis::Vertical, false) => rect.top(),
        }
    }

    /// Signed distance still to travel from `rect`'s leading edge to `target`
    ///
    /// Negative once the leading edge has passed `target`.
    pub fn distance_ahead(&self, rect: &Rect, target: f32) -> f32 {
        (target - self.leading_edge(rect)) * self.sign
    }
}

