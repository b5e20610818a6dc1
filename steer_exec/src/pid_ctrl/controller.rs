//! PID controller and gain types

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The three gains of a PID controller
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64
}

/// The accumulated error terms of a PID controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorTerms {
    /// Most recent error
    pub p: f64,

    /// Sum of all errors since initialisation
    pub i: f64,

    /// Difference between the two most recent errors
    pub d: f64
}

/// A sample-based PID controller
#[derive(Debug, Default, Clone, Serialize)]
pub struct PidController {
    gains: Gains,

    errors: ErrorTerms
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gains {
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }
}

impl From<Vector3<f64>> for Gains {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Gains> for Vector3<f64> {
    fn from(g: Gains) -> Self {
        Vector3::new(g.k_p, g.k_i, g.k_d)
    }
}

impl std::fmt::Display for Gains {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P: {} I: {} D: {}", self.k_p, self.k_i, self.k_d)
    }
}

impl ErrorTerms {
    /// All terms being exactly zero is used as the "no sample yet" marker.
    fn all_zero(&self) -> bool {
        self.p == 0.0 && self.i == 0.0 && self.d == 0.0
    }
}

impl PidController {

    /// Create a new controller with the given gains and zeroed error terms.
    pub fn new(gains: Gains) -> Self {
        Self {
            gains,
            errors: ErrorTerms::default()
        }
    }

    /// Reinitialise the controller, setting the gains and zeroing all error
    /// terms.
    pub fn init(&mut self, gains: Gains) {
        *self = Self::new(gains);
    }

    /// Replace the gains, leaving the error terms untouched.
    pub fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
    }

    /// Get the current gains.
    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Get the current error terms.
    pub fn error_terms(&self) -> ErrorTerms {
        self.errors
    }

    /// Record a new error sample.
    ///
    /// If all error terms are exactly zero the sample is treated as the first
    /// one and seeds `p` so that no derivative spike is produced. A sequence
    /// which drives all three terms back to exactly zero will hit this branch
    /// again.
    pub fn record_error(&mut self, cte: f64) {
        if self.errors.all_zero() {
            self.errors.p = cte;
        }

        // `p` still holds the previous sample here
        self.errors.d = cte - self.errors.p;
        self.errors.p = cte;
        self.errors.i += cte;

        trace!("PID errors: {:?}", self.errors);
    }

    /// Get the controller output for the current error terms.
    pub fn total_error(&self) -> f64 {
        -(self.gains.k_p * self.errors.p
            + self.gains.k_d * self.errors.d
            + self.gains.k_i * self.errors.i)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
