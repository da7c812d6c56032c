//! Core types for the intersection simulation
//!
//! Plain data types shared by every engine component.

use serde::{Deserialize, Serialize};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
///
/// IDs are handed out in creation order, so a lower ID is an older vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub SimId);

/// A wrapper type for signal head IDs (the numbering exposed over the control API)
pub type LightId = u32;

/// A 2D position in screen space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coordinate along the given axis
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Returns a copy moved by `delta` along the given axis
    pub fn offset_along(&self, axis: Axis, delta: f32) -> Position {
        match axis {
            Axis::Horizontal => Position::new(self.x + delta, self.y),
            Axis::Vertical => Position::new(self.x, self.y + delta),
        }
    }
}

/// The axis a vehicle travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Direction of travel through the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Approach {
    #[serde(rename = "up-down")]
    UpDown,
    #[serde(rename = "down-up")]
    DownUp,
    #[serde(rename = "left-right")]
    LeftRight,
    #[serde(rename = "right-left")]
    RightLeft,
}

impl Approach {
    pub const ALL: [Approach; 4] = [
        Approach::UpDown,
        Approach::DownUp,
        Approach::LeftRight,
        Approach::RightLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::UpDown => "up-down",
            Approach::DownUp => "down-up",
            Approach::LeftRight => "left-right",
            Approach::RightLeft => "right-left",
        }
    }
}

/// The side of the intersection a signal head faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightDirection {
    Up,
    Down,
    Left,
    Right,
}

impl LightDirection {
    pub fn axis(&self) -> Axis {
        match self {
            LightDirection::Up | LightDirection::Down => Axis::Vertical,
            LightDirection::Left | LightDirection::Right => Axis::Horizontal,
        }
    }
}

/// Logical lane used for counting vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Top,
    Bottom,
    Left,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::Top, Lane::Bottom, Lane::Left, Lane::Right];
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap test; rectangles that only share an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Grow the rectangle by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// The visible viewport and the larger region vehicles stay alive in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBounds {
    pub viewport: Rect,
    pub extended: Rect,
}

impl SimBounds {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        let viewport = Rect::new(0.0, 0.0, width, height);
        Self {
            viewport,
            extended: viewport.inflate(margin),
        }
    }

    pub fn center(&self) -> Position {
        self.viewport.center()
    }
}

/// Width and height of the simulated area
pub const VIEWPORT_WIDTH: f32 = 600.0;
pub const VIEWPORT_HEIGHT: f32 = 600.0;

/// How far beyond the viewport vehicles keep being simulated
pub const EXTENDED_MARGIN: f32 = 50.0;

/// Distance between the two lanes of an approach
pub const LANE_WIDTH: f32 = 50.0;

/// Vehicle footprint: length along the axis of travel, width across it
pub const VEHICLE_LENGTH: f32 = 20.0;
pub const VEHICLE_WIDTH: f32 = 10.0;

/// Pixels travelled per tick
pub const VEHICLE_SPEED: f32 = 2.0;

/// Window ahead of a signal anchor inside which a vehicle facing red halts
pub const STOP_DISTANCE: f32 = 150.0;

/// Global cap on live vehicles
pub const MAX_VEHICLES: usize = 40;
