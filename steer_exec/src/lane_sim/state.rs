//! Lane simulation state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{LaneSimError, Params};
use crate::steer_ctrl::SteerCmd;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The simulated vehicle and lane
#[derive(Debug, Clone)]
pub struct LaneSim {
    params: Params,

    state: VehicleState,

    /// Number of resets performed since creation
    num_resets: u64
}

/// The state of the vehicle relative to the lane centreline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleState {
    /// Time since the last reset
    pub time_s: f64,

    /// Distance travelled along the centreline since the last reset
    pub dist_m: f64,

    /// Lateral offset from the centreline, +ve to the right
    pub lat_offset_m: f64,

    /// Heading relative to the centreline, +ve to the right
    pub head_error_rad: f64,

    pub speed_ms: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneSim {
    /// Create a new simulation with the vehicle at its initial state.
    pub fn new(params: Params) -> Result<Self, LaneSimError> {
        params.validate()?;

        Ok(Self {
            state: Self::initial_state(&params),
            params,
            num_resets: 0
        })
    }

    /// The current cross-track error.
    pub fn cte(&self) -> f64 {
        self.state.lat_offset_m
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn num_resets(&self) -> u64 {
        self.num_resets
    }

    /// True if the vehicle has left the track.
    pub fn is_off_track(&self) -> bool {
        self.state.lat_offset_m.abs() > self.params.track_half_width_m
    }

    /// Put the vehicle back at its initial state.
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.params);
        self.num_resets += 1;

        trace!("LaneSim reset ({} resets)", self.num_resets);
    }

    /// Advance the simulation by one step with the given command.
    pub fn step(&mut self, cmd: &SteerCmd) {
        let p = &self.params;
        let s = &mut self.state;

        s.speed_ms = cmd.throttle * p.speed_per_throttle_ms;

        let wheel_angle_rad = cmd.steering_angle * p.max_wheel_angle_rad + p.steering_drift_rad;
        let path_curv_m = p.curv_amplitude_m
            * (std::f64::consts::TAU * s.dist_m / p.curv_period_m).sin();

        // Rates from the current state
        let lat_rate_ms = s.speed_ms * s.head_error_rad.sin();
        let along_rate_ms = s.speed_ms * s.head_error_rad.cos();
        let head_rate_rads = s.speed_ms * (wheel_angle_rad.tan() / p.wheelbase_m - path_curv_m);

        s.lat_offset_m += lat_rate_ms * p.dt_s;
        s.dist_m += along_rate_ms * p.dt_s;
        s.head_error_rad += head_rate_rads * p.dt_s;
        s.time_s += p.dt_s;
    }

    fn initial_state(params: &Params) -> VehicleState {
        VehicleState {
            lat_offset_m: params.init_lat_offset_m,
            head_error_rad: params.init_head_error_rad,
            ..VehicleState::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Straight lane without drift
    fn straight_params() -> Params {
        Params {
            steering_drift_rad: 0.0,
            curv_amplitude_m: 0.0,
            ..Params::default()
        }
    }

    fn cmd(steering_angle: f64) -> SteerCmd {
        SteerCmd { steering_angle, throttle: 0.3 }
    }

    #[test]
    fn test_straight_drive_holds_offset() {
        let mut sim = LaneSim::new(straight_params()).unwrap();

        for _ in 0..100 {
            sim.step(&cmd(0.0));
        }

        assert_eq!(sim.cte(), 1.0);
        assert_eq!(sim.state().head_error_rad, 0.0);
        assert!((sim.state().dist_m - 100.0 * 0.05 * 13.5).abs() < 1e-9);
        assert!((sim.state().time_s - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_steer_moves_right() {
        let mut sim = LaneSim::new(straight_params()).unwrap();

        for _ in 0..20 {
            sim.step(&cmd(0.5));
        }

        assert!(sim.state().head_error_rad > 0.0);
        assert!(sim.cte() > 1.0);
    }

    #[test]
    fn test_drift_turns_without_steering() {
        let mut sim = LaneSim::new(Params {
            curv_amplitude_m: 0.0,
            ..Params::default()
        }).unwrap();

        for _ in 0..20 {
            sim.step(&cmd(0.0));
        }

        assert!(sim.state().head_error_rad > 0.0);
    }

    #[test]
    fn test_zero_throttle_stands_still() {
        let mut sim = LaneSim::new(Params::default()).unwrap();

        sim.step(&SteerCmd { steering_angle: 1.0, throttle: 0.0 });

        assert_eq!(sim.cte(), 1.0);
        assert_eq!(sim.state().head_error_rad, 0.0);
        assert_eq!(sim.state().speed_ms, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut sim = LaneSim::new(Params::default()).unwrap();
        let initial = *sim.state();

        for _ in 0..50 {
            sim.step(&cmd(1.0));
        }
        assert_ne!(*sim.state(), initial);

        sim.reset();

        assert_eq!(*sim.state(), initial);
        assert_eq!(sim.num_resets(), 1);
    }

    #[test]
    fn test_off_track() {
        let mut sim = LaneSim::new(Params {
            init_lat_offset_m: 2.9,
            ..straight_params()
        }).unwrap();
        assert!(!sim.is_off_track());

        for _ in 0..100 {
            sim.step(&cmd(0.1));
        }

        assert!(sim.is_off_track());
    }
}
