//! Request and response shapes of the control API
//!
//! Field names are the ones clients already use, so these serialize as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::simulation::{LaneCounters, LightDirection, LightId, Position, SignalHead};

/// A signal head as listed by `traffic-lights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficLightView {
    pub id: LightId,
    pub pos: [f32; 2],
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
    pub direction: LightDirection,
}

impl From<&SignalHead> for TrafficLightView {
    fn from(light: &SignalHead) -> Self {
        Self {
            id: light.id,
            pos: [light.position.x, light.position.y],
            red: light.red,
            yellow: light.yellow,
            green: light.green,
            direction: light.direction,
        }
    }
}

impl From<&TrafficLightView> for SignalHead {
    fn from(view: &TrafficLightView) -> Self {
        let mut light = SignalHead::new(
            view.id,
            view.direction,
            Position::new(view.pos[0], view.pos[1]),
        );
        light.set(view.red, view.yellow, view.green);
        light
    }
}

/// Body of a single-light update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightStatus {
    pub id: LightId,
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

impl LightStatus {
    pub fn new(id: LightId, red: bool, yellow: bool, green: bool) -> Self {
        Self {
            id,
            red,
            yellow,
            green,
        }
    }
}

/// Result of `check-accident`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentStatus {
    pub is_accident: bool,
    pub message: String,
}

/// Body of `log-accident`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentReport {
    pub message: String,
    #[serde(default = "default_true")]
    pub is_accident: bool,
}

fn default_true() -> bool {
    true
}

/// One line of the accident log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentLogEntry {
    pub message: String,
    pub is_accident: bool,
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement returned by `log-accident`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogAck {
    pub status: String,
    pub entry: AccidentLogEntry,
}

/// A named bulk light-state preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficPattern {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub lights: Vec<LightStatus>,
}

/// Result of `apply-pattern/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternApplied {
    pub pattern: String,
    pub traffic_lights: Vec<TrafficLightView>,
}

/// Result of `statistics`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_cars: u32,
    pub cars_per_lane: LaneCounters,
    pub accidents: usize,
    pub timestamp: DateTime<Utc>,
}

/// Result of `reset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub status: String,
    pub lane_counters: LaneCounters,
    pub accident_logs: usize,
}

/// Result of `health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
