//! # Steering control module
//!
//! Steering control closes the loop between the cross-track error reported
//! by the simulation and the steering command sent back to it. Each cycle:
//!
//! 1. The CTE is passed through the PID controller.
//! 2. The controller output is clamped into the steering range and sent with
//!    a fixed throttle.
//! 3. If tuning is enabled and Twiddle has not finished, the squared
//!    controller output is fed to Twiddle. When Twiddle completes a window
//!    its gains are copied into the controller and a reset of the
//!    simulation is requested.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use serde_json::json;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A steering command for the vehicle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct SteerCmd {
    /// Normalised steering demand, +ve steers right.
    ///
    /// Units: between -1 and +1
    pub steering_angle: f64,

    /// Normalised throttle demand.
    pub throttle: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during initialisation or processing of
/// the module.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid steering limits, expected finite min < max, found [{0}, {1}]")]
    InvalidSteerLimits(f64, f64),

    #[error("The throttle must be finite, found {0}")]
    InvalidThrottle(f64),

    #[error("The initial gains must be finite")]
    NonFiniteGains,

    #[error("Could not initialise Twiddle: {0}")]
    TwiddleError(crate::twiddle::TwiddleError),

    #[error("Could not write the steering control archives: {0}")]
    ArchiveError(util::archive::ArchiveError),

    /// The CTE was NaN or infinite and cannot be given to the controller.
    #[error("Received a non-finite cross-track error ({0})")]
    NonFiniteCte(f64)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerCmd {
    /// The steering event payload for this command.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "steering_angle": self.steering_angle,
            "throttle": self.throttle
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steer_cmd_json() {
        let cmd = SteerCmd { steering_angle: -0.25, throttle: 0.3 };
        assert_eq!(
            cmd.to_json().to_string(),
            r#"{"steering_angle":-0.25,"throttle":0.3}"#
        );
    }
}
