//! Four-way intersection traffic simulation
//!
//! A discrete, fixed-speed simulation engine plus the control service that
//! owns the signal state it reads.

pub mod control;
pub mod error;
pub mod simulation;
