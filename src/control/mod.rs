//! Control service for the intersection
//!
//! The in-process owner of signal heads and lane counters, the API shapes it
//! speaks, a line-based protocol for driving it, and snapshot persistence.

mod api;
mod protocol;
mod server;
mod snapshot;

pub use api::{
    AccidentLogEntry, AccidentReport, AccidentStatus, Health, LightStatus, LogAck,
    PatternApplied, ResetAck, Statistics, TrafficLightView, TrafficPattern,
};
pub use protocol::{handle, handle_line, parse_request, Request, Response};
pub use server::{builtin_patterns, ControlServer};
pub use snapshot::ControlSnapshot;
