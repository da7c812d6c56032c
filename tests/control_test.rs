//! Control service validation
//!
//! Light updates, accident checks and logging, patterns, reset, the line
//! protocol and snapshot persistence.

use std::collections::BTreeMap;

use chrono::Utc;
use crossroad_sim::control::{
    handle_line, AccidentReport, ControlServer, ControlSnapshot, LightStatus, TrafficPattern,
};
use crossroad_sim::error::ControlError;
use crossroad_sim::simulation::{
    default_signal_heads, AccidentDetector, AccidentPolicy, IntersectionSource, LaneCounters,
    ACCIDENT_MESSAGE, CLEAR_MESSAGE,
};

fn lights(server: &mut ControlServer, states: [(bool, bool, bool); 4]) {
    for (i, (red, yellow, green)) in states.into_iter().enumerate() {
        server
            .update_traffic_light(&LightStatus::new(i as u32 + 1, red, yellow, green))
            .unwrap();
    }
}

const RED: (bool, bool, bool) = (true, false, false);
const GREEN: (bool, bool, bool) = (false, false, true);
const YELLOW: (bool, bool, bool) = (false, true, false);

#[test]
fn test_default_lights() {
    let server = ControlServer::new();
    let lights = server.traffic_lights();

    assert_eq!(lights.len(), 4);
    assert_eq!(
        lights.iter().map(|l| l.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert!(lights.iter().all(|l| l.red && !l.green));
    // The left head starts with its yellow lamp lit as well
    assert!(lights[1].yellow);
    assert_eq!(lights[0].pos, [270.0, 180.0]);
    assert_eq!(lights[3].pos, [400.0, 270.0]);
}

#[test]
fn test_update_light_reflected_in_listing() {
    let mut server = ControlServer::new();
    let updated = server
        .update_traffic_light(&LightStatus::new(3, false, false, true))
        .unwrap();

    let light = updated.iter().find(|l| l.id == 3).unwrap();
    assert!(light.green && !light.red && !light.yellow);
    assert_eq!(server.traffic_lights(), updated);
}

#[test]
fn test_unknown_light_is_rejected_without_change() {
    let mut server = ControlServer::new();
    let before = server.traffic_lights();

    let err = server
        .update_traffic_light(&LightStatus::new(9, false, false, true))
        .unwrap_err();
    assert!(matches!(err, ControlError::LightNotFound(9)));
    assert_eq!(err.status(), 404);
    assert_eq!(server.traffic_lights(), before);
}

#[test]
fn test_crossing_greens_are_an_accident() {
    let mut server = ControlServer::new();
    lights(&mut server, [GREEN, GREEN, RED, RED]);

    let status = server.check_accident();
    assert!(status.is_accident);
    assert_eq!(status.message, ACCIDENT_MESSAGE);
    assert_eq!(server.accident_logs().len(), 1);
}

#[test]
fn test_parallel_greens_are_not_an_accident() {
    let mut server = ControlServer::new();

    lights(&mut server, [GREEN, RED, GREEN, RED]);
    let status = server.check_accident();
    assert!(!status.is_accident);
    assert_eq!(status.message, CLEAR_MESSAGE);

    lights(&mut server, [RED, GREEN, RED, GREEN]);
    assert!(!server.check_accident().is_accident);

    // Yellow never conflicts
    lights(&mut server, [YELLOW, YELLOW, YELLOW, YELLOW]);
    assert!(!server.check_accident().is_accident);

    assert!(server.accident_logs().is_empty());
}

#[test]
fn test_ongoing_conflict_logged_once() {
    let mut server = ControlServer::new();
    lights(&mut server, [RED, RED, GREEN, GREEN]);

    for _ in 0..5 {
        assert!(server.check_accident().is_accident);
    }
    assert_eq!(server.accident_logs().len(), 1);

    // Clear, then conflict again: a new onset
    lights(&mut server, [RED, RED, GREEN, RED]);
    server.check_accident();
    lights(&mut server, [RED, RED, GREEN, GREEN]);
    server.check_accident();
    assert_eq!(server.accident_logs().len(), 2);
}

#[test]
fn test_level_policy_logs_every_check() {
    let mut detector = AccidentDetector::new(AccidentPolicy::Level);
    let mut lights = default_signal_heads();
    for light in &mut lights {
        light.set(false, false, true);
    }

    let now = Utc::now();
    assert!(detector.observe(&lights, now).is_some());
    assert!(detector.observe(&lights, now).is_some());
    assert!(detector.is_active());

    let mut edge = AccidentDetector::new(AccidentPolicy::Edge);
    assert!(edge.observe(&lights, now).is_some());
    assert!(edge.observe(&lights, now).is_none());
}

#[test]
fn test_engine_report_does_not_duplicate_check() {
    let mut server = ControlServer::new();
    lights(&mut server, [GREEN, GREEN, RED, RED]);
    server.check_accident();

    // The engine raises the same conflict independently
    let event = crossroad_sim::simulation::AccidentEvent {
        message: ACCIDENT_MESSAGE.to_string(),
        timestamp: Utc::now(),
    };
    server.record_accident(&event).unwrap();
    assert_eq!(server.accident_logs().len(), 1);
}

#[test]
fn test_log_accident_and_statistics() {
    let mut server = ControlServer::new();
    server.set_lane_counters(LaneCounters {
        top: 3,
        bottom: 1,
        left: 0,
        right: 2,
    });

    let ack = server.log_accident(AccidentReport {
        message: "fender bender".to_string(),
        is_accident: true,
    });
    assert_eq!(ack.status, "logged");
    server.log_accident(AccidentReport {
        message: "near miss".to_string(),
        is_accident: false,
    });

    let logs = server.accident_logs();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "fender bender");

    let stats = server.statistics();
    assert_eq!(stats.total_cars, 6);
    assert_eq!(stats.cars_per_lane.top, 3);
    assert_eq!(stats.accidents, 1);
}

#[test]
fn test_reset_is_idempotent() {
    let mut server = ControlServer::new();
    lights(&mut server, [GREEN, RED, GREEN, RED]);
    server.set_lane_counters(LaneCounters {
        top: 4,
        bottom: 4,
        left: 4,
        right: 4,
    });
    server.log_accident(AccidentReport {
        message: "x".to_string(),
        is_accident: true,
    });
    let lights_before = server.traffic_lights();

    let first = server.reset();
    let second = server.reset();

    assert_eq!(first, second);
    assert_eq!(first.lane_counters, LaneCounters::default());
    assert_eq!(first.accident_logs, 0);
    assert_eq!(server.traffic_lights(), lights_before);
}

#[test]
fn test_builtin_patterns() {
    let mut server = ControlServer::new();
    let names: Vec<&str> = server.traffic_patterns().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["all-red", "caution", "east-west", "north-south"]);

    let applied = server.apply_pattern("north-south").unwrap();
    assert_eq!(applied.pattern, "north-south");
    let green: Vec<u32> = applied
        .traffic_lights
        .iter()
        .filter(|l| l.green)
        .map(|l| l.id)
        .collect();
    assert_eq!(green, vec![1, 3]);
    assert!(!server.check_accident().is_accident);

    let err = server.apply_pattern("disco").unwrap_err();
    assert!(matches!(err, ControlError::PatternNotFound(_)));
    assert_eq!(err.status(), 404);
}

#[test]
fn test_custom_pattern_validation() {
    let mut server = ControlServer::new();

    let bad = TrafficPattern {
        name: "ghost".to_string(),
        description: String::new(),
        lights: vec![LightStatus::new(7, false, false, true)],
    };
    let err = server.create_traffic_pattern(bad).unwrap_err();
    assert!(matches!(err, ControlError::InvalidPattern(_)));
    assert_eq!(err.status(), 422);

    let unnamed = TrafficPattern {
        name: "  ".to_string(),
        description: String::new(),
        lights: vec![],
    };
    assert!(server.create_traffic_pattern(unnamed).is_err());

    let flash = TrafficPattern {
        name: "flash".to_string(),
        description: "Left only".to_string(),
        lights: vec![LightStatus::new(2, false, false, true)],
    };
    server.create_traffic_pattern(flash).unwrap();
    server.apply_pattern("flash").unwrap();

    let left = server.traffic_lights().into_iter().find(|l| l.id == 2).unwrap();
    assert!(left.green);
}

#[test]
fn test_pattern_with_missing_light_changes_nothing() {
    let mut snapshot = ControlServer::new().to_snapshot();
    snapshot.traffic_patterns = BTreeMap::from([(
        "broken".to_string(),
        TrafficPattern {
            name: "broken".to_string(),
            description: String::new(),
            lights: vec![
                LightStatus::new(1, false, false, true),
                LightStatus::new(42, false, false, true),
            ],
        },
    )]);
    let mut server = ControlServer::from_snapshot(snapshot, AccidentPolicy::Edge);
    let before = server.traffic_lights();

    let err = server.apply_pattern("broken").unwrap_err();
    assert!(matches!(err, ControlError::LightNotFound(42)));
    assert_eq!(server.traffic_lights(), before);
}

#[test]
fn test_protocol_round_trip() {
    let mut server = ControlServer::new();

    let (response, shutdown) = handle_line(&mut server, r#"{"op":"health"}"#);
    assert_eq!(response.status, 200);
    assert_eq!(response.body["status"], "ok");
    assert!(!shutdown);

    let (response, _) = handle_line(
        &mut server,
        r#"{"op":"post_lane_counters","top":2,"bottom":0,"left":1,"right":0}"#,
    );
    assert!(response.is_success());
    assert_eq!(response.body["top"], 2);

    let (response, _) = handle_line(&mut server, r#"{"op":"get_statistics"}"#);
    assert_eq!(response.body["total_cars"], 3);

    let (response, _) = handle_line(
        &mut server,
        r#"{"op":"post_traffic_lights","id":2,"red":false,"yellow":false,"green":true}"#,
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body[1]["green"], true);

    let (response, _) = handle_line(&mut server, r#"{"op":"log_accident","message":"bump"}"#);
    assert_eq!(response.status, 200);
    assert_eq!(response.body["entry"]["is_accident"], true);

    let (response, _) = handle_line(&mut server, r#"{"op":"get_accident_logs"}"#);
    assert_eq!(response.body.as_array().map(|a| a.len()), Some(1));

    let (_, shutdown) = handle_line(&mut server, r#"{"op":"shutdown"}"#);
    assert!(shutdown);
}

#[test]
fn test_protocol_rejects_bad_input() {
    let mut server = ControlServer::new();

    let (response, shutdown) = handle_line(&mut server, "not json");
    assert_eq!(response.status, 400);
    assert!(response.body["detail"].is_string());
    assert!(!shutdown);

    let (response, _) = handle_line(&mut server, r#"{"op":"teleport"}"#);
    assert_eq!(response.status, 400);

    // Counters are non-negative
    let (response, _) = handle_line(
        &mut server,
        r#"{"op":"post_lane_counters","top":-1,"bottom":0,"left":0,"right":0}"#,
    );
    assert_eq!(response.status, 400);
    assert_eq!(server.lane_counters(), LaneCounters::default());

    let (response, _) = handle_line(
        &mut server,
        r#"{"op":"post_traffic_lights","id":11,"red":true,"yellow":false,"green":false}"#,
    );
    assert_eq!(response.status, 404);

    let (response, _) = handle_line(&mut server, r#"{"op":"apply_pattern","name":"nope"}"#);
    assert_eq!(response.status, 404);
}

#[test]
fn test_snapshot_file_round_trip() {
    let path = std::env::temp_dir().join(format!(
        "crossroad_snapshot_{}.json",
        std::process::id()
    ));

    let mut server = ControlServer::new();
    server.apply_pattern("east-west").unwrap();
    server.set_lane_counters(LaneCounters {
        top: 1,
        bottom: 2,
        left: 3,
        right: 4,
    });
    server.log_accident(AccidentReport {
        message: "scrape".to_string(),
        is_accident: true,
    });
    server.save_snapshot(&path).unwrap();

    let restored = ControlServer::load_snapshot(&path, AccidentPolicy::Level).unwrap();
    let _ = std::fs::remove_file(&path);

    let expected: ControlSnapshot = server.to_snapshot();
    assert_eq!(restored.to_snapshot(), expected);
    assert_eq!(restored.policy(), AccidentPolicy::Level);
}

#[test]
fn test_missing_snapshot_is_an_error() {
    let path = std::env::temp_dir().join("crossroad_snapshot_does_not_exist.json");
    assert!(ControlServer::load_snapshot(&path, AccidentPolicy::Edge).is_err());
}
