//! Signal heads, lane counters and the state object that owns them

use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{Lane, LightDirection, LightId, Position, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::error::ControlError;

/// The red/yellow/green indicator governing one approach
///
/// The three lamps are independent; nothing here forces exactly one of them on.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHead {
    pub id: LightId,
    pub direction: LightDirection,
    /// Anchor point; its coordinate along the governed axis is the stop line
    pub position: Position,
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl SignalHead {
    pub fn new(id: LightId, direction: LightDirection, position: Position) -> Self {
        Self {
            id,
            direction,
            position,
            red: true,
            yellow: false,
            green: false,
        }
    }

    pub fn set(&mut self, red: bool, yellow: bool, green: bool) {
        self.red = red;
        self.yellow = yellow;
        self.green = green;
    }

    /// Stop line coordinate along the axis of the traffic this head governs
    pub fn stop_line(&self) -> f32 {
        self.position.along(self.direction.axis())
    }
}

/// The four signal heads of the default 600x600 layout, all showing red
pub fn default_signal_heads() -> Vec<SignalHead> {
    signal_heads_for(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)
}

/// Signal heads placed around the centre of a `width` x `height` viewport
pub fn signal_heads_for(width: f32, height: f32) -> Vec<SignalHead> {
    let cx = width / 2.0;
    let cy = height / 2.0;

    let mut left = SignalHead::new(2, LightDirection::Left, Position::new(cx - 120.0, cy - 30.0));
    left.yellow = true;

    vec![
        SignalHead::new(1, LightDirection::Up, Position::new(cx - 30.0, cy - 120.0)),
        left,
        SignalHead::new(3, LightDirection::Down, Position::new(cx - 30.0, cy + 100.0)),
        SignalHead::new(4, LightDirection::Right, Position::new(cx + 100.0, cy - 30.0)),
    ]
}

/// Number of vehicles attributed to each logical lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaneCounters {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl LaneCounters {
    pub fn get(&self, lane: Lane) -> u32 {
        match lane {
            Lane::Top => self.top,
            Lane::Bottom => self.bottom,
            Lane::Left => self.left,
            Lane::Right => self.right,
        }
    }

    fn slot(&mut self, lane: Lane) -> &mut u32 {
        match lane {
            Lane::Top => &mut self.top,
            Lane::Bottom => &mut self.bottom,
            Lane::Left => &mut self.left,
            Lane::Right => &mut self.right,
        }
    }

    pub fn increment(&mut self, lane: Lane) {
        let slot = self.slot(lane);
        *slot = slot.saturating_add(1);
    }

    /// Decrement, clamping at zero
    ///
    /// Returns false when the counter was already zero (for instance after an
    /// external reset) and nothing was subtracted.
    pub fn decrement(&mut self, lane: Lane) -> bool {
        let slot = self.slot(lane);
        if *slot == 0 {
            warn!("Lane counter {:?} already at zero, not decrementing", lane);
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self) -> u32 {
        Lane::ALL.iter().map(|lane| self.get(*lane)).sum()
    }
}

/// Immutable copy of the intersection state used for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionSnapshot {
    pub lights: Vec<SignalHead>,
    pub counters: LaneCounters,
}

impl IntersectionSnapshot {
    /// The head facing `direction`, if the layout has one
    pub fn light(&self, direction: LightDirection) -> Option<&SignalHead> {
        self.lights.iter().find(|l| l.direction == direction)
    }

    /// Whether the head facing `direction` currently shows green
    pub fn is_green(&self, direction: LightDirection) -> bool {
        self.light(direction).is_some_and(|l| l.green)
    }
}

impl Default for IntersectionSnapshot {
    fn default() -> Self {
        Self {
            lights: default_signal_heads(),
            counters: LaneCounters::default(),
        }
    }
}

/// Authoritative holder of the signal heads and lane counters
#[derive(Debug, Clone, Default)]
pub struct IntersectionState {
    snapshot: IntersectionSnapshot,
}

impl IntersectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lights(lights: Vec<SignalHead>) -> Self {
        Self {
            snapshot: IntersectionSnapshot {
                lights,
                counters: LaneCounters::default(),
            },
        }
    }

    pub fn get_lights(&self) -> &[SignalHead] {
        &self.snapshot.lights
    }

    /// Update the lamps of one head; unknown ids leave the state untouched
    pub fn set_light(
        &mut self,
        id: LightId,
        red: bool,
        yellow: bool,
        green: bool,
    ) -> Result<&SignalHead, ControlError> {
        let light = self
            .snapshot
            .lights
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(ControlError::LightNotFound(id))?;
        light.set(red, yellow, green);
        Ok(light)
    }

    pub fn has_light(&self, id: LightId) -> bool {
        self.snapshot.lights.iter().any(|l| l.id == id)
    }

    pub fn get_counters(&self) -> LaneCounters {
        self.snapshot.counters
    }

    pub fn set_counters(&mut self, counters: LaneCounters) {
        self.snapshot.counters = counters;
    }

    pub fn snapshot(&self) -> IntersectionSnapshot {
        self.snapshot.clone()
    }
}
