//! Twiddle parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::TwiddleError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Twiddle tuner
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TwiddleParams {
    /// The search has converged once the sum of the deltas is below this
    /// value.
    pub tolerance: f64,

    /// Number of samples in one evaluation window.
    pub window_length: u64,

    /// The initial deltas are this fraction of the initial gains.
    pub delta_fraction: f64,

    /// Factor applied to a gain's delta when a change to that gain improved
    /// the error.
    pub scale_up: f64,

    /// Factor applied to a gain's delta when neither direction improved the
    /// error.
    pub scale_down: f64,

    /// If true, accepting an increase moves to the next gain without
    /// increasing it, leaving that gain's first probe to be evaluated at its
    /// current value.
    pub defer_increase_on_accept: bool,

    /// Optional limit on the number of windows the search may evaluate.
    pub max_windows: Option<u64>,

    /// Log every window's gains, deltas and errors at info level.
    pub debug: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TwiddleParams {
    fn default() -> Self {
        Self {
            tolerance: 0.005,
            window_length: 10_000,
            delta_fraction: 1.0 / 30.0,
            scale_up: 1.1,
            scale_down: 0.9,
            defer_increase_on_accept: false,
            max_windows: None,
            debug: false
        }
    }
}

impl TwiddleParams {
    /// Check that the parameters describe a usable search.
    pub fn validate(&self) -> Result<(), TwiddleError> {
        if self.window_length == 0 {
            return Err(TwiddleError::ZeroWindowLength)
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(TwiddleError::InvalidTolerance(self.tolerance))
        }

        if !self.delta_fraction.is_finite() || self.delta_fraction <= 0.0 {
            return Err(TwiddleError::InvalidDeltaFraction(self.delta_fraction))
        }

        if !self.scale_up.is_finite() || self.scale_up <= 1.0 {
            return Err(TwiddleError::InvalidScaleUp(self.scale_up))
        }

        if !(self.scale_down > 0.0 && self.scale_down < 1.0) {
            return Err(TwiddleError::InvalidScaleDown(self.scale_down))
        }

        if self.max_windows == Some(0) {
            return Err(TwiddleError::ZeroMaxWindows)
        }

        Ok(())
    }
}
