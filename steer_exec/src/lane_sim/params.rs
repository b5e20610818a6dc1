//! Lane simulation parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::LaneSimError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the lane simulation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Simulation step
    pub dt_s: f64,

    /// Distance between the front and rear axles
    pub wheelbase_m: f64,

    /// Wheel angle for a full (+1) steering demand
    pub max_wheel_angle_rad: f64,

    /// Vehicle speed for a full (+1) throttle demand
    pub speed_per_throttle_ms: f64,

    /// Constant offset added to the wheel angle
    pub steering_drift_rad: f64,

    pub init_lat_offset_m: f64,

    pub init_head_error_rad: f64,

    /// Peak curvature of the centreline
    pub curv_amplitude_m: f64,

    /// Distance over which the centreline curvature repeats
    pub curv_period_m: f64,

    /// The vehicle is off track once further than this from the centreline
    pub track_half_width_m: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            dt_s: 0.05,
            wheelbase_m: 2.67,
            max_wheel_angle_rad: 25f64.to_radians(),
            speed_per_throttle_ms: 45.0,
            steering_drift_rad: 0.01,
            init_lat_offset_m: 1.0,
            init_head_error_rad: 0.0,
            curv_amplitude_m: 0.005,
            curv_period_m: 600.0,
            track_half_width_m: 3.0
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), LaneSimError> {
        let all = [
            ("dt_s", self.dt_s),
            ("wheelbase_m", self.wheelbase_m),
            ("max_wheel_angle_rad", self.max_wheel_angle_rad),
            ("speed_per_throttle_ms", self.speed_per_throttle_ms),
            ("steering_drift_rad", self.steering_drift_rad),
            ("init_lat_offset_m", self.init_lat_offset_m),
            ("init_head_error_rad", self.init_head_error_rad),
            ("curv_amplitude_m", self.curv_amplitude_m),
            ("curv_period_m", self.curv_period_m),
            ("track_half_width_m", self.track_half_width_m)
        ];

        for (name, value) in all.iter() {
            if !value.is_finite() {
                return Err(LaneSimError::NonFiniteParam(*name, *value))
            }
        }

        let positive = [
            ("dt_s", self.dt_s),
            ("wheelbase_m", self.wheelbase_m),
            ("max_wheel_angle_rad", self.max_wheel_angle_rad),
            ("curv_period_m", self.curv_period_m),
            ("track_half_width_m", self.track_half_width_m)
        ];

        for (name, value) in positive.iter() {
            if *value <= 0.0 {
                return Err(LaneSimError::NonPositiveParam(*name, *value))
            }
        }

        // Drift could push the wheel past pi/2 where tan flips sign
        if self.max_wheel_angle_rad + self.steering_drift_rad.abs()
            >= std::f64::consts::FRAC_PI_2
        {
            return Err(LaneSimError::WheelAngleTooLarge(self.max_wheel_angle_rad))
        }

        Ok(())
    }
}
