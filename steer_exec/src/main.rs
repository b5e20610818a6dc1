//! Steering controller executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise SteerCtrl and the lane simulation
//!     - Main loop:
//!         - Get the cross-track error from the simulation
//!         - Steering control processing (PID + Twiddle)
//!         - Reset or step the simulation
//!         - Write archives
//!
//! The loop ends once the cycle limit is reached, or once tuning has
//! finished if tuning is enabled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use steer_lib::{
    lane_sim::{self, LaneSim},
    steer_ctrl::{InitData, InputData, SteerCtrl}
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(
    name = "steer_exec",
    about = "PID steering control of a simulated vehicle, with optional Twiddle gain tuning"
)]
struct Opts {
    /// Tune the gains with Twiddle, regardless of the parameter file
    #[structopt(long)]
    tune: bool,

    /// Never tune the gains, regardless of the parameter file
    #[structopt(long, conflicts_with = "tune")]
    no_tune: bool,

    /// Log every cycle and every Twiddle window at info level
    #[structopt(long)]
    debug: bool,

    /// Pace the loop to the simulation step rather than running flat out
    #[structopt(long)]
    realtime: bool,

    /// Maximum number of cycles to run
    #[structopt(long, default_value = "200000")]
    max_cycles: u64,

    /// SteerCtrl parameter file, relative to the params directory
    #[structopt(long, default_value = "steer_ctrl.toml")]
    ctrl_params: String,

    /// Lane simulation parameter file, relative to the params directory
    #[structopt(long, default_value = "lane_sim.toml")]
    sim_params: String
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("steer_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Info, LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Steering Controller Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let sim_params: lane_sim::Params = util::params::load(&opts.sim_params)
        .wrap_err("Could not load lane simulation params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let tune = if opts.tune {
        Some(true)
    }
    else if opts.no_tune {
        Some(false)
    }
    else {
        None
    };

    let mut steer_ctrl = SteerCtrl::default();
    steer_ctrl.init(
        InitData {
            params_path: opts.ctrl_params.clone(),
            tune,
            debug: opts.debug
        },
        &session
    ).wrap_err("Failed to initialise SteerCtrl")?;
    info!("SteerCtrl init complete");

    let cycle_period = Duration::from_secs_f64(sim_params.dt_s);
    let mut sim = LaneSim::new(sim_params)
        .wrap_err("Failed to initialise the lane simulation")?;
    info!("LaneSim init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let tuning = steer_ctrl.twiddle().is_some();
    let mut num_cycles: u64 = 0;
    let mut num_off_track: u64 = 0;

    while num_cycles < opts.max_cycles {

        let cycle_start_instant = Instant::now();

        // ---- STEERING CONTROL ----

        let (output, report) = steer_ctrl
            .proc(&InputData { cte_m: sim.cte() })
            .wrap_err("Error during SteerCtrl processing")?;

        // ---- SIMULATION ----

        if output.reset {
            sim.reset();
        }
        else {
            sim.step(&output.cmd);

            if sim.is_off_track() {
                warn!(
                    "Vehicle left the track at {:.02} m (CTE {:.03} m), resetting",
                    sim.state().dist_m,
                    sim.cte()
                );
                num_off_track += 1;
                sim.reset();
            }
        }

        // ---- WRITE ARCHIVES ----

        steer_ctrl.write().wrap_err("Failed to write SteerCtrl archives")?;

        num_cycles += 1;

        if tuning && report.window_complete {
            if let Some(r) = steer_ctrl.twiddle().and_then(|t| t.last_report()) {
                info!(
                    "Window {} complete: error {:.06} (best {:.06}), delta sum {:.06}",
                    r.window, r.window_error, r.best_error, r.delta_sum
                );
            }
        }

        if tuning && steer_ctrl.tuning_finished() {
            info!("Tuning finished, stopping");
            break
        }

        // ---- CYCLE MANAGEMENT ----

        if opts.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match cycle_period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                )
            }
        }
    }

    // ---- SHUTDOWN ----

    info!("Ran {} cycles, left the track {} times", num_cycles, num_off_track);
    info!("Final gains: {}", steer_ctrl.gains());

    if let Some(twiddle) = steer_ctrl.twiddle() {
        info!(
            "Twiddle completed {} windows, best error {}",
            twiddle.windows_completed(),
            twiddle.best_error()
        );
    }

    info!("End of execution");

    Ok(())
}
