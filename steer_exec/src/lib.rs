//! # Steering library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to
//! access items defined inside the steering crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Lane simulation - a simple vehicle model standing in for the driving simulator
pub mod lane_sim;

/// PID controller - converts cross-track error into a steering correction
pub mod pid_ctrl;

/// Steering control module - closes the loop between the CTE and the steering command
pub mod steer_ctrl;

/// Twiddle - coordinate ascent tuning of the PID gains
pub mod twiddle;
