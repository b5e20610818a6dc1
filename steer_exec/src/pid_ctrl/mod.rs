//! # PID controller module
//!
//! The steering controller turns a stream of cross-track error (CTE) samples
//! into a steering correction using the standard PID law. The error terms are
//! kept in their raw, unscaled form:
//!
//! - `p`: the most recent CTE,
//! - `i`: the running sum of every CTE since initialisation,
//! - `d`: the change between the current and previous CTE.
//!
//! The correction is `-(k_p * p + k_d * d + k_i * i)`, so a positive CTE
//! (vehicle to the right of the path) produces a negative (leftward)
//! steering demand.
//!
//! The controller is sample-based rather than time-based: there is no `dt`,
//! the caller is expected to supply samples at a fixed rate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controller;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controller::*;
