//! Tunable parameters for a simulation run

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::accident::AccidentPolicy;
use super::approach::SPAWN_GAP;
use super::types::{
    Approach, SimBounds, EXTENDED_MARGIN, MAX_VEHICLES, STOP_DISTANCE, VEHICLE_LENGTH,
    VEHICLE_SPEED, VIEWPORT_HEIGHT, VIEWPORT_WIDTH,
};

/// Ticks between spawns, per approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnIntervals {
    #[serde(rename = "up-down")]
    pub up_down: u32,
    #[serde(rename = "down-up")]
    pub down_up: u32,
    #[serde(rename = "left-right")]
    pub left_right: u32,
    #[serde(rename = "right-left")]
    pub right_left: u32,
}

impl SpawnIntervals {
    /// Same interval on every approach
    pub fn uniform(ticks: u32) -> Self {
        Self {
            up_down: ticks,
            down_up: ticks,
            left_right: ticks,
            right_left: ticks,
        }
    }

    pub fn get(&self, approach: Approach) -> u32 {
        match approach {
            Approach::UpDown => self.up_down,
            Approach::DownUp => self.down_up,
            Approach::LeftRight => self.left_right,
            Approach::RightLeft => self.right_left,
        }
    }
}

impl Default for SpawnIntervals {
    fn default() -> Self {
        Self {
            up_down: 90,
            down_up: 120,
            left_right: 75,
            right_left: 105,
        }
    }
}

/// Configuration for a simulation run
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Extra band around the viewport in which vehicles are still simulated
    pub extended_margin: f32,
    pub stop_distance: f32,
    /// Pixels per tick
    pub vehicle_speed: f32,
    pub spawn_intervals: SpawnIntervals,
    pub max_vehicles: usize,
    /// Fraction of `max_vehicles` at which off-screen vehicles are culled
    pub high_water_ratio: f32,
    /// Ticks a vehicle may stay put under a green signal before it is removed
    pub stall_ticks: u32,
    /// Run the lifecycle sweep every this many ticks
    pub lifecycle_interval: u32,
    /// Target cadence; 0 runs as fast as possible
    pub ticks_per_second: u32,
    pub accident_policy: AccidentPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            extended_margin: EXTENDED_MARGIN,
            stop_distance: STOP_DISTANCE,
            vehicle_speed: VEHICLE_SPEED,
            spawn_intervals: SpawnIntervals::default(),
            max_vehicles: MAX_VEHICLES,
            high_water_ratio: 0.9,
            stall_ticks: 180,
            lifecycle_interval: 1,
            ticks_per_second: 60,
            accident_policy: AccidentPolicy::Edge,
        }
    }
}

impl SimConfig {
    /// Read a JSON config file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !positive(self.viewport_width) || !positive(self.viewport_height) {
            anyhow::bail!("Viewport must have a positive size");
        }
        if !(self.extended_margin.is_finite() && self.extended_margin > SPAWN_GAP + VEHICLE_LENGTH)
        {
            anyhow::bail!(
                "extended_margin must exceed {} so fresh vehicles start inside the extended bound",
                SPAWN_GAP + VEHICLE_LENGTH
            );
        }
        if !(self.stop_distance.is_finite() && self.stop_distance >= 0.0) {
            anyhow::bail!("stop_distance must be zero or more");
        }
        if !positive(self.vehicle_speed) {
            anyhow::bail!("vehicle_speed must be positive");
        }
        if !(0.0..=1.0).contains(&self.high_water_ratio) {
            anyhow::bail!("high_water_ratio must be within 0.0..=1.0");
        }
        if self.stall_ticks == 0 {
            anyhow::bail!("stall_ticks must be at least 1");
        }
        if self.lifecycle_interval == 0 {
            anyhow::bail!("lifecycle_interval must be at least 1");
        }
        Ok(())
    }

    pub fn bounds(&self) -> SimBounds {
        SimBounds::new(
            self.viewport_width,
            self.viewport_height,
            self.extended_margin,
        )
    }

    /// Live vehicle count at which capacity relief starts
    pub fn high_water_mark(&self) -> usize {
        (self.max_vehicles as f32 * self.high_water_ratio).ceil() as usize
    }
}

/// Finite and above zero; NaN fails
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
