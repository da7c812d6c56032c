//! Conflicting-green detection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intersection::SignalHead;
use super::types::LightDirection;

/// Message attached to every accident event
pub const ACCIDENT_MESSAGE: &str =
    "Potential accident: crossing traffic has green signals at the same time";

/// Message reported while no conflict holds
pub const CLEAR_MESSAGE: &str = "No conflicting green signals";

/// When an ongoing conflict produces events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccidentPolicy {
    /// Once, when the conflict starts
    #[default]
    Edge,
    /// On every evaluation while the conflict holds
    Level,
}

/// A detected conflict
#[derive(Debug, Clone, PartialEq)]
pub struct AccidentEvent {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// True when horizontal and vertical traffic are both allowed to go
pub fn is_conflict(lights: &[SignalHead]) -> bool {
    let green = |direction: LightDirection| {
        lights
            .iter()
            .any(|light| light.direction == direction && light.green)
    };
    let horizontal = green(LightDirection::Left) || green(LightDirection::Right);
    let vertical = green(LightDirection::Up) || green(LightDirection::Down);
    horizontal && vertical
}

/// Watches signal state and raises events per the configured policy
///
/// Only reads the lights it is given.
#[derive(Debug, Clone, Default)]
pub struct AccidentDetector {
    policy: AccidentPolicy,
    active: bool,
}

impl AccidentDetector {
    pub fn new(policy: AccidentPolicy) -> Self {
        Self {
            policy,
            active: false,
        }
    }

    pub fn policy(&self) -> AccidentPolicy {
        self.policy
    }

    /// Whether the last evaluation saw a conflict
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn observe(&mut self, lights: &[SignalHead], now: DateTime<Utc>) -> Option<AccidentEvent> {
        let conflict = is_conflict(lights);
        let onset = conflict && !self.active;
        self.active = conflict;

        let raise = match self.policy {
            AccidentPolicy::Edge => onset,
            AccidentPolicy::Level => conflict,
        };

        raise.then(|| AccidentEvent {
            message: ACCIDENT_MESSAGE.to_string(),
            timestamp: now,
        })
    }

    /// Drop the ongoing-conflict state once `lights` no longer conflict
    ///
    /// Never raises an event, so a conflict that only exists halfway through
    /// a batch of light updates is not reported.
    pub fn settle(&mut self, lights: &[SignalHead]) {
        if !is_conflict(lights) {
            self.active = false;
        }
    }

    /// Forget any ongoing conflict so the next one is reported afresh
    pub fn reset(&mut self) {
        self.active = false;
    }
}
