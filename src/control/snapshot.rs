//! Saving and restoring control state to a JSON file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::api::{AccidentLogEntry, TrafficLightView, TrafficPattern};
use super::server::ControlServer;
use crate::simulation::{AccidentPolicy, IntersectionState, LaneCounters, SignalHead};

/// On-disk form of a [`ControlServer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    pub traffic_lights: Vec<TrafficLightView>,
    pub lane_counters: LaneCounters,
    #[serde(default)]
    pub accident_logs: Vec<AccidentLogEntry>,
    #[serde(default)]
    pub traffic_patterns: BTreeMap<String, TrafficPattern>,
}

impl ControlServer {
    pub fn to_snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            traffic_lights: self.traffic_lights(),
            lane_counters: self.lane_counters(),
            accident_logs: self.accident_logs().to_vec(),
            traffic_patterns: self.traffic_patterns().clone(),
        }
    }

    pub fn from_snapshot(snapshot: ControlSnapshot, policy: AccidentPolicy) -> Self {
        let lights: Vec<SignalHead> = snapshot
            .traffic_lights
            .iter()
            .map(SignalHead::from)
            .collect();
        let mut state = IntersectionState::with_lights(lights);
        state.set_counters(snapshot.lane_counters);

        ControlServer::from_parts(
            state,
            snapshot.accident_logs,
            snapshot.traffic_patterns,
            policy,
        )
    }

    /// Write the state to `path`, replacing the file in one step
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_snapshot())
            .context("Failed to serialize control snapshot")?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write snapshot to {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;
        Ok(())
    }

    pub fn load_snapshot(path: &Path, policy: AccidentPolicy) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: ControlSnapshot = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        Ok(Self::from_snapshot(snapshot, policy))
    }
}
