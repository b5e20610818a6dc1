//! # Lane simulation module
//!
//! A lightweight stand-in for the driving simulator, allowing steering
//! control and Twiddle to be run without any external software.
//!
//! The vehicle is a kinematic bicycle model expressed in the frame of the
//! lane centreline:
//!
//! - `lat_offset_m`: distance from the centreline, +ve to the right. This is
//!   the cross-track error given to steering control.
//! - `head_error_rad`: angle between the vehicle heading and the
//!   centreline, +ve when pointing to the right.
//!
//! The centreline curves with a sinusoidal curvature profile and the
//! steering carries a constant drift, which the integral term has to cancel.
//! States are propagated with explicit Euler integration.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when building the simulation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LaneSimError {
    #[error("Parameter `{0}` must be finite, found {1}")]
    NonFiniteParam(&'static str, f64),

    #[error("Parameter `{0}` must be positive, found {1}")]
    NonPositiveParam(&'static str, f64),

    #[error("The maximum wheel angle must be below pi/2, found {0}")]
    WheelAngleTooLarge(f64)
}
