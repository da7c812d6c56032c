//! JSON-lines control protocol
//!
//! Each request is one JSON object on one line with an `"op"` discriminator,
//! for example `{"op":"post_traffic_lights","id":1,"red":false,"yellow":false,"green":true}`.
//! Each response is one line `{"status":200,"body":...}` using HTTP status
//! codes. Lines that do not parse are answered with 400 and never reach the
//! server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::api::{AccidentReport, LightStatus, TrafficPattern};
use super::server::ControlServer;
use crate::error::ControlError;
use crate::simulation::LaneCounters;

/// A control request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GetLaneCounters,
    PostLaneCounters(LaneCounters),
    GetTrafficLights,
    PostTrafficLights(LightStatus),
    CheckAccident,
    LogAccident(AccidentReport),
    GetAccidentLogs,
    GetTrafficPatterns,
    PostTrafficPattern(TrafficPattern),
    ApplyPattern { name: String },
    GetStatistics,
    Reset,
    Health,
    Shutdown,
}

/// A control response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self {
                status: 500,
                body: serde_json::json!({ "detail": e.to_string() }),
            },
        }
    }

    fn error(err: &ControlError) -> Self {
        Self {
            status: err.status(),
            body: serde_json::json!({ "detail": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Parse one protocol line
pub fn parse_request(line: &str) -> Result<Request, ControlError> {
    serde_json::from_str(line.trim()).map_err(|e| ControlError::Malformed(e.to_string()))
}

/// Apply a request to the server
pub fn handle(server: &mut ControlServer, request: Request) -> Response {
    let result: Result<Response, ControlError> = match request {
        Request::GetLaneCounters => Ok(Response::ok(&server.lane_counters())),
        Request::PostLaneCounters(counters) => Ok(Response::ok(&server.set_lane_counters(counters))),
        Request::GetTrafficLights => Ok(Response::ok(&server.traffic_lights())),
        Request::PostTrafficLights(status) => server
            .update_traffic_light(&status)
            .map(|lights| Response::ok(&lights)),
        Request::CheckAccident => Ok(Response::ok(&server.check_accident())),
        Request::LogAccident(report) => Ok(Response::ok(&server.log_accident(report))),
        Request::GetAccidentLogs => Ok(Response::ok(&server.accident_logs())),
        Request::GetTrafficPatterns => Ok(Response::ok(server.traffic_patterns())),
        Request::PostTrafficPattern(pattern) => server
            .create_traffic_pattern(pattern)
            .map(|stored| Response::ok(stored)),
        Request::ApplyPattern { name } => server
            .apply_pattern(&name)
            .map(|applied| Response::ok(&applied)),
        Request::GetStatistics => Ok(Response::ok(&server.statistics())),
        Request::Reset => Ok(Response::ok(&server.reset())),
        Request::Health => Ok(Response::ok(&server.health())),
        Request::Shutdown => Ok(Response::ok(&serde_json::json!({ "status": "shutting down" }))),
    };

    result.unwrap_or_else(|e| Response::error(&e))
}

/// Parse and apply one line
///
/// Returns the response and whether the client asked to shut down.
pub fn handle_line(server: &mut ControlServer, line: &str) -> (Response, bool) {
    match parse_request(line) {
        Ok(request) => {
            let shutdown = matches!(request, Request::Shutdown);
            (handle(server, request), shutdown)
        }
        Err(e) => (Response::error(&e), false),
    }
}
