//! Steering control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{Params, SteerCmd, SteerCtrlError};
use crate::{
    pid_ctrl::{Gains, PidController},
    twiddle::Twiddle
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering control module state
#[derive(Default)]
pub struct SteerCtrl {
    params: Params,

    pid: PidController,

    /// Twiddle tuner, only present if tuning is enabled.
    twiddle: Option<Twiddle>,

    /// Set once Twiddle has converged or used up its window budget.
    tuning_finished: bool,

    report: StatusReport,
    arch_report: Archiver,

    arch_twiddle: Archiver
}

/// Data needed to initialise steering control.
#[derive(Debug, Clone)]
pub struct InitData {
    /// Path to the parameter file, relative to the params directory.
    pub params_path: String,

    /// Overrides the `tune` parameter if set.
    pub tune: Option<bool>,

    /// Forces the controller and Twiddle debug output on.
    pub debug: bool
}

/// Input data to steering control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The current cross-track error, +ve when right of the path.
    ///
    /// Units: meters
    pub cte_m: f64
}

/// Output data from steering control.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputData {
    /// The command to send to the vehicle
    pub cmd: SteerCmd,

    /// If true the run should be reset, as Twiddle has finished evaluating
    /// a set of gains. The controller already holds the new gains.
    pub reset: bool
}

/// Status report for steering control processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub cte_m: f64,

    /// Controller output before clamping
    pub raw_steer: f64,

    /// Steering demand sent to the vehicle
    pub steer: f64,

    /// True if the controller output was outside the steering limits
    pub steer_limited: bool,

    /// True if the sample was given to Twiddle
    pub tuning: bool,

    /// True if Twiddle finished a window on this cycle
    pub window_complete: bool,

    /// True if Twiddle has converged
    pub converged: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SteerCtrl {
    type InitData = InitData;
    type InitError = SteerCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    /// Initialise the SteerCtrl module.
    ///
    /// Loads the parameter file, applies any overrides and opens the
    /// archives in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let mut params: Params = params::load(&init_data.params_path)
            .map_err(SteerCtrlError::ParamLoadError)?;

        if let Some(tune) = init_data.tune {
            params.tune = tune;
        }
        if init_data.debug {
            params.debug = true;
            params.twiddle.debug = true;
        }

        *self = Self::from_params(params)?;

        if self.params.archive_cycles {
            self.arch_report = Archiver::from_path(
                session, "steer_ctrl/status_report.csv"
            ).map_err(SteerCtrlError::ArchiveError)?;
        }
        if self.twiddle.is_some() {
            self.arch_twiddle = Archiver::from_path(
                session, "steer_ctrl/twiddle_windows.csv"
            ).map_err(SteerCtrlError::ArchiveError)?;
        }

        Ok(())
    }

    /// Perform cyclic processing of steering control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let cte_m = input_data.cte_m;
        if !cte_m.is_finite() {
            return Err(SteerCtrlError::NonFiniteCte(cte_m))
        }

        self.report = StatusReport {
            cte_m,
            ..StatusReport::default()
        };

        self.pid.record_error(cte_m);
        let raw_steer = self.pid.total_error();

        let (steer, steer_limited) = clamp(
            &raw_steer,
            &self.params.min_steer,
            &self.params.max_steer
        );
        self.report.raw_steer = raw_steer;
        self.report.steer = steer;
        self.report.steer_limited = steer_limited;

        let cmd = SteerCmd {
            steering_angle: steer,
            throttle: self.params.throttle
        };

        let mut reset = false;

        if let Some(ref mut twiddle) = self.twiddle {
            // Twiddle may have converged on the initial gains, in which case
            // it must never see a sample
            if !self.tuning_finished
                && (twiddle.has_converged() || twiddle.is_exhausted())
            {
                self.tuning_finished = true;
                info!(
                    "Twiddle converged before any window, holding gains {}",
                    self.pid.gains()
                );
            }

            if !self.tuning_finished {
                self.report.tuning = true;

                // Squared so that errors either side of the path don't cancel
                twiddle.observe(raw_steer * raw_steer);

                if twiddle.reset_pulse() {
                    let gains = twiddle.current_gains();
                    self.pid.set_gains(gains);
                    reset = true;
                    self.report.window_complete = true;

                    debug!("New gains from Twiddle: {}", gains);
                }

                if twiddle.has_converged() || twiddle.is_exhausted() {
                    self.tuning_finished = true;
                    info!(
                        "Tuning finished after {} windows, holding gains {}",
                        twiddle.windows_completed(),
                        self.pid.gains()
                    );
                }
            }

            self.report.converged = twiddle.has_converged();
        }

        if self.params.debug {
            info!("CTE: {} Steering Value: {}", cte_m, steer);
            info!("steer {}", cmd.to_json());
        }
        else {
            trace!("CTE: {} Steering Value: {}", cte_m, steer);
        }

        Ok((OutputData { cmd, reset }, self.report))
    }
}

impl Archived for SteerCtrl {
    /// Write the cycle report, if enabled, and the Twiddle report of the
    /// window which completed this cycle, if any.
    fn write(&mut self) -> Result<(), ArchiveError> {
        if self.params.archive_cycles {
            self.arch_report.serialise(self.report)?;
        }

        if self.report.window_complete {
            if let Some(report) = self.twiddle.as_ref().and_then(|t| t.last_report()) {
                self.arch_twiddle.serialise(report)?;
            }
        }

        Ok(())
    }
}

impl SteerCtrl {
    /// Build the module from parameters without opening any archives.
    pub fn from_params(params: Params) -> Result<Self, SteerCtrlError> {
        params.validate()?;

        let twiddle = if params.tune {
            Some(
                Twiddle::new(params.gains(), &params.twiddle)
                    .map_err(SteerCtrlError::TwiddleError)?
            )
        }
        else {
            None
        };

        info!(
            "SteerCtrl initialised with gains {} (tuning {})",
            params.gains(),
            if params.tune { "enabled" } else { "disabled" }
        );

        Ok(Self {
            pid: PidController::new(params.gains()),
            twiddle,
            params,
            ..Self::default()
        })
    }

    /// The gains currently used by the controller.
    pub fn gains(&self) -> Gains {
        self.pid.gains()
    }

    pub fn twiddle(&self) -> Option<&Twiddle> {
        self.twiddle.as_ref()
    }

    /// True if tuning was enabled and has now finished.
    pub fn tuning_finished(&self) -> bool {
        self.tuning_finished
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
