//! Steering control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::SteerCtrlError;
use crate::{pid_ctrl::Gains, twiddle::TwiddleParams};
use util::maths::all_finite;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Initial proportional gain
    pub k_p: f64,

    /// Initial integral gain
    pub k_i: f64,

    /// Initial derivative gain
    pub k_d: f64,

    /// If true the gains are tuned with Twiddle before being held fixed.
    pub tune: bool,

    /// Log the CTE and steering command of every cycle at info level.
    pub debug: bool,

    /// Fixed throttle demand sent with every steering command.
    pub throttle: f64,

    /// Minimum steering demand
    pub min_steer: f64,

    /// Maximum steering demand
    pub max_steer: f64,

    /// Archive the status report of every cycle, not just Twiddle windows.
    pub archive_cycles: bool,

    pub twiddle: TwiddleParams
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            k_p: 0.188238,
            k_i: 0.0000428868,
            k_d: 2.8665,
            tune: false,
            debug: false,
            throttle: 0.3,
            min_steer: -1.0,
            max_steer: 1.0,
            archive_cycles: false,
            twiddle: TwiddleParams::default()
        }
    }
}

impl Params {
    /// The initial gains of the controller.
    pub fn gains(&self) -> Gains {
        Gains::new(self.k_p, self.k_i, self.k_d)
    }

    pub fn validate(&self) -> Result<(), SteerCtrlError> {
        if !all_finite(&[self.k_p, self.k_i, self.k_d]) {
            return Err(SteerCtrlError::NonFiniteGains)
        }

        if !all_finite(&[self.min_steer, self.max_steer])
            || self.min_steer >= self.max_steer
        {
            return Err(SteerCtrlError::InvalidSteerLimits(self.min_steer, self.max_steer))
        }

        if !self.throttle.is_finite() {
            return Err(SteerCtrlError::InvalidThrottle(self.throttle))
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_from_toml() {
        let p: Params = util::params::from_str(r#"
            k_p = 0.2
            k_i = 0.0001
            k_d = 3.0
            tune = true

            [twiddle]
            tolerance = 0.01
            window_length = 2000
        "#).unwrap();

        assert_eq!(p.gains(), Gains::new(0.2, 0.0001, 3.0));
        assert!(p.tune);
        assert_eq!(p.throttle, 0.3);
        assert_eq!(p.twiddle.tolerance, 0.01);
        assert_eq!(p.twiddle.window_length, 2000);
        assert_eq!(p.twiddle.scale_down, 0.9);
        assert_eq!(p.validate().ok(), Some(()));
    }

    #[test]
    fn test_validate() {
        let p = Params { min_steer: 1.0, max_steer: -1.0, ..Params::default() };
        assert!(matches!(
            p.validate(),
            Err(SteerCtrlError::InvalidSteerLimits(_, _))
        ));

        let p = Params { k_d: std::f64::INFINITY, ..Params::default() };
        assert!(matches!(p.validate(), Err(SteerCtrlError::NonFiniteGains)));

        let p = Params { throttle: std::f64::NAN, ..Params::default() };
        assert!(matches!(p.validate(), Err(SteerCtrlError::InvalidThrottle(_))));
    }
}
