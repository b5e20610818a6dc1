//! # Twiddle gain tuning module
//!
//! Twiddle is a coordinate ascent search over the three PID gains. The
//! tuner accumulates the (squared) controller error over a fixed window of
//! samples and, at the end of each window, decides how to perturb one gain:
//!
//! 1. The first window only establishes the baseline error, after which
//!    `k_p` is increased by its delta.
//! 2. If increasing a gain improved on the best error the change is kept, the
//!    gain's delta grows and the search moves to the next gain. Otherwise the
//!    gain is probed in the opposite direction.
//! 3. If the decrease improved the change is kept and the delta grows,
//!    otherwise the gain is restored and its delta shrinks. Either way the
//!    search moves on to the next gain, which is increased straight away.
//!
//! After every decision the caller is asked to reset the run so that each
//! window starts from comparable conditions. The search has converged once
//! the sum of the deltas falls below the tolerance.
//!
//! Setting `window_length` to 1 gives the per-sample variant of the search.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::TwiddleParams;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when setting up the tuner.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TwiddleError {
    #[error("The window length must be at least one sample")]
    ZeroWindowLength,

    #[error("The tolerance must be finite and non-negative, found {0}")]
    InvalidTolerance(f64),

    #[error("The delta fraction must be finite and positive, found {0}")]
    InvalidDeltaFraction(f64),

    #[error("The scale up factor must be greater than 1, found {0}")]
    InvalidScaleUp(f64),

    #[error("The scale down factor must be between 0 and 1 (exclusive), found {0}")]
    InvalidScaleDown(f64),

    #[error("The window budget must be at least one window")]
    ZeroMaxWindows,

    #[error("The initial gains must be finite")]
    NonFiniteGains
}
