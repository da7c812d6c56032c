//! In-process owner of the intersection state
//!
//! Holds the signal heads and lane counters the engine syncs with, plus the
//! accident log and the traffic pattern table the control API works on.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use std::collections::BTreeMap;

use super::api::{
    AccidentLogEntry, AccidentReport, AccidentStatus, Health, LightStatus, LogAck,
    PatternApplied, ResetAck, Statistics, TrafficLightView, TrafficPattern,
};
use crate::error::ControlError;
use crate::simulation::{
    is_conflict, AccidentDetector, AccidentEvent, AccidentPolicy, IntersectionSnapshot,
    IntersectionSource, IntersectionState, LaneCounters, ACCIDENT_MESSAGE, CLEAR_MESSAGE,
};

/// Patterns available on a fresh server, keyed by name
///
/// Light ids follow the default layout: 1 up, 2 left, 3 down, 4 right.
pub fn builtin_patterns() -> BTreeMap<String, TrafficPattern> {
    let pattern = |name: &str, description: &str, lights: [LightStatus; 4]| {
        (
            name.to_string(),
            TrafficPattern {
                name: name.to_string(),
                description: description.to_string(),
                lights: lights.to_vec(),
            },
        )
    };

    let red = |id| LightStatus::new(id, true, false, false);
    let green = |id| LightStatus::new(id, false, false, true);
    let yellow = |id| LightStatus::new(id, false, true, false);

    BTreeMap::from([
        pattern(
            "all-red",
            "Stop every approach",
            [red(1), red(2), red(3), red(4)],
        ),
        pattern(
            "north-south",
            "Vertical traffic flows, horizontal traffic waits",
            [green(1), red(2), green(3), red(4)],
        ),
        pattern(
            "east-west",
            "Horizontal traffic flows, vertical traffic waits",
            [red(1), green(2), red(3), green(4)],
        ),
        pattern(
            "caution",
            "Every approach shows yellow",
            [yellow(1), yellow(2), yellow(3), yellow(4)],
        ),
    ])
}

/// The control service behind the traffic-lights / lane-counters API
#[derive(Debug, Clone)]
pub struct ControlServer {
    state: IntersectionState,
    accident_log: Vec<AccidentLogEntry>,
    patterns: BTreeMap<String, TrafficPattern>,
    detector: AccidentDetector,
}

impl Default for ControlServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlServer {
    pub fn new() -> Self {
        Self::with_state(IntersectionState::new(), AccidentPolicy::default())
    }

    pub fn with_state(state: IntersectionState, policy: AccidentPolicy) -> Self {
        Self {
            state,
            accident_log: Vec::new(),
            patterns: builtin_patterns(),
            detector: AccidentDetector::new(policy),
        }
    }

    pub(crate) fn from_parts(
        state: IntersectionState,
        accident_log: Vec<AccidentLogEntry>,
        patterns: BTreeMap<String, TrafficPattern>,
        policy: AccidentPolicy,
    ) -> Self {
        Self {
            state,
            accident_log,
            patterns,
            detector: AccidentDetector::new(policy),
        }
    }

    pub fn state(&self) -> &IntersectionState {
        &self.state
    }

    pub fn policy(&self) -> AccidentPolicy {
        self.detector.policy()
    }

    /// GET lane-counters
    pub fn lane_counters(&self) -> LaneCounters {
        self.state.get_counters()
    }

    /// POST lane-counters; echoes what was stored
    pub fn set_lane_counters(&mut self, counters: LaneCounters) -> LaneCounters {
        self.state.set_counters(counters);
        self.state.get_counters()
    }

    /// GET traffic-lights
    pub fn traffic_lights(&self) -> Vec<TrafficLightView> {
        self.state
            .get_lights()
            .iter()
            .map(TrafficLightView::from)
            .collect()
    }

    /// POST traffic-lights
    pub fn update_traffic_light(
        &mut self,
        status: &LightStatus,
    ) -> Result<Vec<TrafficLightView>, ControlError> {
        self.state
            .set_light(status.id, status.red, status.yellow, status.green)?;
        // A resolved conflict ends the episode even if nobody polled check-accident
        self.detector.settle(self.state.get_lights());
        info!(
            "Light {} set to red={} yellow={} green={}",
            status.id, status.red, status.yellow, status.green
        );
        Ok(self.traffic_lights())
    }

    /// GET check-accident; appends to the log when the detector raises an event
    pub fn check_accident(&mut self) -> AccidentStatus {
        let now = Utc::now();
        if let Some(event) = self.detector.observe(self.state.get_lights(), now) {
            self.push_event(&event);
        }

        let is_accident = is_conflict(self.state.get_lights());
        AccidentStatus {
            is_accident,
            message: if is_accident {
                ACCIDENT_MESSAGE.to_string()
            } else {
                CLEAR_MESSAGE.to_string()
            },
        }
    }

    /// POST log-accident
    pub fn log_accident(&mut self, report: AccidentReport) -> LogAck {
        let entry = AccidentLogEntry {
            message: report.message,
            is_accident: report.is_accident,
            timestamp: Utc::now(),
        };
        self.accident_log.push(entry.clone());
        LogAck {
            status: "logged".to_string(),
            entry,
        }
    }

    /// GET log-accident
    pub fn accident_logs(&self) -> &[AccidentLogEntry] {
        &self.accident_log
    }

    /// GET traffic-patterns
    pub fn traffic_patterns(&self) -> &BTreeMap<String, TrafficPattern> {
        &self.patterns
    }

    /// POST traffic-patterns; replaces any pattern with the same name
    pub fn create_traffic_pattern(
        &mut self,
        pattern: TrafficPattern,
    ) -> Result<&TrafficPattern, ControlError> {
        if pattern.name.trim().is_empty() {
            return Err(ControlError::InvalidPattern(
                "pattern name must not be empty".to_string(),
            ));
        }
        if let Some(unknown) = pattern.lights.iter().find(|l| !self.state.has_light(l.id)) {
            return Err(ControlError::InvalidPattern(format!(
                "pattern '{}' refers to unknown light {}",
                pattern.name, unknown.id
            )));
        }

        let name = pattern.name.clone();
        info!("Stored traffic pattern '{}'", name);
        self.patterns.insert(name.clone(), pattern);
        self.patterns
            .get(&name)
            .ok_or(ControlError::PatternNotFound(name))
    }

    /// POST apply-pattern/{name}
    ///
    /// Applied as a sequence of single-light updates. Every id is checked
    /// first so a bad pattern changes nothing.
    pub fn apply_pattern(&mut self, name: &str) -> Result<PatternApplied, ControlError> {
        let pattern = self
            .patterns
            .get(name)
            .cloned()
            .ok_or_else(|| ControlError::PatternNotFound(name.to_string()))?;

        if let Some(unknown) = pattern.lights.iter().find(|l| !self.state.has_light(l.id)) {
            return Err(ControlError::LightNotFound(unknown.id));
        }

        for status in &pattern.lights {
            self.update_traffic_light(status)?;
        }
        info!("Applied traffic pattern '{}'", name);

        Ok(PatternApplied {
            pattern: pattern.name,
            traffic_lights: self.traffic_lights(),
        })
    }

    /// GET statistics
    pub fn statistics(&self) -> Statistics {
        let counters = self.state.get_counters();
        Statistics {
            total_cars: counters.total(),
            cars_per_lane: counters,
            accidents: self.accident_log.iter().filter(|e| e.is_accident).count(),
            timestamp: Utc::now(),
        }
    }

    /// POST reset; lights and patterns are left alone
    pub fn reset(&mut self) -> ResetAck {
        self.state.set_counters(LaneCounters::default());
        self.accident_log.clear();
        self.detector.reset();
        info!("Control state reset");
        ResetAck {
            status: "reset".to_string(),
            lane_counters: self.state.get_counters(),
            accident_logs: self.accident_log.len(),
        }
    }

    /// GET health
    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }

    fn push_event(&mut self, event: &AccidentEvent) {
        warn!("Accident logged: {}", event.message);
        self.accident_log.push(AccidentLogEntry {
            message: event.message.clone(),
            is_accident: true,
            timestamp: event.timestamp,
        });
    }
}

impl IntersectionSource for ControlServer {
    fn fetch(&mut self) -> Result<IntersectionSnapshot> {
        Ok(self.state.snapshot())
    }

    fn publish_counters(&mut self, counters: &LaneCounters) -> Result<()> {
        self.state.set_counters(*counters);
        Ok(())
    }

    /// The server's own detector decides whether the event is new, so a
    /// conflict already logged through `check_accident` is not logged twice.
    fn record_accident(&mut self, event: &AccidentEvent) -> Result<()> {
        if let Some(logged) = self.detector.observe(self.state.get_lights(), event.timestamp) {
            self.push_event(&logged);
        }
        Ok(())
    }
}
