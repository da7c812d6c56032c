//! Errors surfaced at the control boundary

use thiserror::Error;

use crate::simulation::LightId;

/// Failures reported to control callers
///
/// The engine itself never produces these; they only describe requests that
/// were refused before touching intersection state.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no traffic light with id {0}")]
    LightNotFound(LightId),

    #[error("no traffic pattern named '{0}'")]
    PatternNotFound(String),

    #[error("invalid traffic pattern: {0}")]
    InvalidPattern(String),

    #[error("malformed request: {0}")]
    Malformed(String),
}

impl ControlError {
    /// HTTP-style status code used by the line protocol
    pub fn status(&self) -> u16 {
        match self {
            ControlError::LightNotFound(_) | ControlError::PatternNotFound(_) => 404,
            ControlError::InvalidPattern(_) => 422,
            ControlError::Malformed(_) => 400,
        }
    }
}
