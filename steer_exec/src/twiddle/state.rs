//! Twiddle tuner state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{TwiddleError, TwiddleParams};
use crate::pid_ctrl::Gains;
use util::maths::all_finite;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of gains being tuned
const NUM_GAINS: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The Twiddle tuner.
#[derive(Debug, Clone)]
pub struct Twiddle {
    params: TwiddleParams,

    /// Gains in the order `k_p`, `k_i`, `k_d`
    gains: Vector3<f64>,

    /// Perturbation step for each gain
    deltas: Vector3<f64>,

    /// Index of the gain currently being probed
    active_index: usize,

    phase: TwiddlePhase,

    /// True until the baseline window has completed
    is_first_cycle: bool,

    window_error_sum: f64,
    sample_count: u64,

    /// Lowest window error seen so far
    best_error: f64,

    /// Latched once the deltas have summed to less than the tolerance
    converged: bool,

    reset_requested: bool,

    windows_completed: u64,

    last_report: Option<TwiddleReport>
}

/// A record of one completed window.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TwiddleReport {
    /// Index of the window, starting at 0 for the baseline.
    pub window: u64,

    pub decision: TwiddleDecision,

    /// Accumulated error of the window
    pub window_error: f64,

    /// Best error after the decision
    pub best_error: f64,

    /// The gain which the decision applied to
    pub tuned_index: usize,

    /// The gain which will be probed in the next window
    pub next_index: usize,

    pub next_phase: TwiddlePhase,

    pub k_p: f64,
    pub k_i: f64,
    pub k_d: f64,

    pub delta_k_p: f64,
    pub delta_k_i: f64,
    pub delta_k_d: f64,

    pub delta_sum: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where the two sided probe of the active gain currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TwiddlePhase {
    /// The active gain has been increased by its delta and is awaiting
    /// evaluation.
    IncreasePending,

    /// The active gain has been decreased to its original value minus its
    /// delta and is awaiting evaluation.
    DecreasePending
}

/// The decision taken at the end of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TwiddleDecision {
    /// The first window, which only sets the baseline error.
    Baseline,

    /// The probed change improved the error and was kept.
    Accepted,

    /// The increase did not improve, the decrease is now being probed.
    ProbeDecrease,

    /// Neither direction improved, the gain was restored.
    Reverted
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Twiddle {
    /// Create a new tuner starting from the given gains.
    ///
    /// The deltas are seeded as `params.delta_fraction` of each gain, so a
    /// gain which starts at zero will never be moved by the search. A
    /// negative gain seeds a negative delta, which counts against the
    /// tolerance and can leave the tuner converged before any sample.
    pub fn new(gains: Gains, params: &TwiddleParams) -> Result<Self, TwiddleError> {
        params.validate()?;

        let gains: Vector3<f64> = gains.into();
        if !all_finite(gains.as_slice()) {
            return Err(TwiddleError::NonFiniteGains)
        }

        Ok(Self {
            params: params.clone(),
            gains,
            deltas: gains * params.delta_fraction,
            active_index: 0,
            phase: TwiddlePhase::IncreasePending,
            is_first_cycle: true,
            window_error_sum: 0.0,
            sample_count: 0,
            best_error: std::f64::INFINITY,
            converged: false,
            reset_requested: false,
            windows_completed: 0,
            last_report: None
        })
    }

    /// Add an error sample to the current window.
    ///
    /// The sample should be non-negative (usually the squared controller
    /// output) so that windows are comparable. Once the window is full a
    /// single search step is run and the reset pulse is raised. The pulse is
    /// cleared by the first sample of the next window.
    ///
    /// Samples are ignored once the window budget has been used up.
    pub fn observe(&mut self, error_sample: f64) {
        if self.is_exhausted() {
            return
        }

        if self.sample_count == 0 {
            self.reset_requested = false;
        }

        self.window_error_sum += error_sample;
        self.sample_count += 1;

        if self.sample_count >= self.params.window_length {
            self.step();
        }
    }

    /// Returns true once the sum of the deltas has dropped below the
    /// tolerance. Once true this will always return true.
    pub fn has_converged(&mut self) -> bool {
        if !self.converged && self.deltas.sum() < self.params.tolerance {
            self.converged = true;
            info!(
                "Twiddle converged after {} windows with gains {}",
                self.windows_completed,
                self.current_gains()
            );
        }

        self.converged
    }

    /// Returns true if the window budget has been used up.
    pub fn is_exhausted(&self) -> bool {
        match self.params.max_windows {
            Some(m) => self.windows_completed >= m,
            None => false
        }
    }

    /// The current gains of the search.
    pub fn current_gains(&self) -> Gains {
        self.gains.into()
    }

    /// Returns true between the end of a window and the first sample of the
    /// next one, indicating the caller should take the new gains and reset
    /// the run.
    pub fn reset_pulse(&self) -> bool {
        self.reset_requested
    }

    pub fn deltas(&self) -> Vector3<f64> {
        self.deltas
    }

    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    pub fn phase(&self) -> TwiddlePhase {
        self.phase
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    /// Report on the most recently completed window, if any.
    pub fn last_report(&self) -> Option<&TwiddleReport> {
        self.last_report.as_ref()
    }

    /// Run one step of the search using the error of the window which has
    /// just completed.
    fn step(&mut self) {
        let window_error = self.window_error_sum;
        let tuned_index = self.active_index;

        let decision = if self.is_first_cycle {
            self.best_error = window_error;
            self.gains[tuned_index] += self.deltas[tuned_index];
            self.phase = TwiddlePhase::IncreasePending;
            self.is_first_cycle = false;

            TwiddleDecision::Baseline
        }
        else {
            let improved = window_error < self.best_error;

            match (self.phase, improved) {
                (TwiddlePhase::IncreasePending, true) => {
                    self.accept(window_error);
                    self.advance(!self.params.defer_increase_on_accept);
                    TwiddleDecision::Accepted
                },
                (TwiddlePhase::IncreasePending, false) => {
                    // Undo the increase and step the same distance below the
                    // original value
                    self.gains[tuned_index] -= 2.0 * self.deltas[tuned_index];
                    self.phase = TwiddlePhase::DecreasePending;
                    TwiddleDecision::ProbeDecrease
                },
                (TwiddlePhase::DecreasePending, true) => {
                    self.accept(window_error);
                    self.advance(true);
                    TwiddleDecision::Accepted
                },
                (TwiddlePhase::DecreasePending, false) => {
                    self.gains[tuned_index] += self.deltas[tuned_index];
                    self.deltas[tuned_index] *= self.params.scale_down;
                    self.advance(true);
                    TwiddleDecision::Reverted
                }
            }
        };

        let report = TwiddleReport {
            window: self.windows_completed,
            decision,
            window_error,
            best_error: self.best_error,
            tuned_index,
            next_index: self.active_index,
            next_phase: self.phase,
            k_p: self.gains[0],
            k_i: self.gains[1],
            k_d: self.gains[2],
            delta_k_p: self.deltas[0],
            delta_k_i: self.deltas[1],
            delta_k_d: self.deltas[2],
            delta_sum: self.deltas.sum()
        };

        if self.params.debug {
            info!(
                "Twiddle window {}: error {} (best {}), {:?} gain {}",
                report.window, window_error, self.best_error, decision, tuned_index
            );
            info!("    P: {} I: {} D: {}", report.k_p, report.k_i, report.k_d);
            info!("    dP: {} dI: {} dD: {}", report.delta_k_p, report.delta_k_i, report.delta_k_d);
        }
        else {
            debug!("Twiddle window {}: {:?}", report.window, report);
        }

        self.last_report = Some(report);
        self.windows_completed += 1;

        // Start a fresh window and ask for the run to be reset
        self.window_error_sum = 0.0;
        self.sample_count = 0;
        self.reset_requested = true;
    }

    /// Keep the change to the active gain and grow its delta.
    fn accept(&mut self, window_error: f64) {
        self.best_error = window_error;
        self.deltas[self.active_index] *= self.params.scale_up;
    }

    /// Move on to the next gain, optionally starting its increase probe
    /// immediately.
    fn advance(&mut self, apply_increase: bool) {
        self.active_index = (self.active_index + 1) % NUM_GAINS;
        self.phase = TwiddlePhase::IncreasePending;

        if apply_increase {
            self.gains[self.active_index] += self.deltas[self.active_index];
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const EPS: f64 = 1e-12;

    fn params(window_length: u64, tolerance: f64) -> TwiddleParams {
        TwiddleParams {
            tolerance,
            window_length,
            delta_fraction: 0.1,
            ..TwiddleParams::default()
        }
    }

    /// Feed one full window where every sample is `sample`.
    fn feed_window(twiddle: &mut Twiddle, sample: f64, window_length: u64) {
        for _ in 0..window_length {
            twiddle.observe(sample);
        }
    }

    fn assert_gains_near(actual: Gains, expected: (f64, f64, f64)) {
        assert!(
            (actual.k_p - expected.0).abs() < EPS
                && (actual.k_i - expected.1).abs() < EPS
                && (actual.k_d - expected.2).abs() < EPS,
            "gains {:?} != {:?}", actual, expected
        );
    }

    #[test]
    fn test_initial_state() {
        let gains = Gains::new(0.188238, 0.0000428868, 2.8665);
        let mut twiddle = Twiddle::new(gains, &TwiddleParams::default()).unwrap();

        assert_eq!(twiddle.current_gains(), gains);
        assert_eq!(twiddle.best_error(), std::f64::INFINITY);
        assert_eq!(twiddle.phase(), TwiddlePhase::IncreasePending);
        assert_eq!(twiddle.active_index(), 0);
        assert!(!twiddle.reset_pulse());
        assert!(!twiddle.has_converged());
        assert!(twiddle.last_report().is_none());
    }

    #[test]
    fn test_constant_error_probes_decrease() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(10, 0.1)).unwrap();
        assert_eq!(twiddle.deltas(), Vector3::new(0.1, 0.1, 0.1));

        // Baseline
        feed_window(&mut twiddle, 1.0, 10);
        assert_eq!(twiddle.best_error(), 10.0);
        assert_gains_near(twiddle.current_gains(), (1.1, 1.0, 1.0));
        assert_eq!(twiddle.last_report().unwrap().decision, TwiddleDecision::Baseline);

        // Equal error is not an improvement
        feed_window(&mut twiddle, 1.0, 10);
        assert_gains_near(twiddle.current_gains(), (0.9, 1.0, 1.0));
        assert_eq!(twiddle.phase(), TwiddlePhase::DecreasePending);
        assert_eq!(twiddle.active_index(), 0);
        assert_eq!(twiddle.last_report().unwrap().decision, TwiddleDecision::ProbeDecrease);

        // Neither direction helped, restore and move on to k_i
        feed_window(&mut twiddle, 1.0, 10);
        assert_gains_near(twiddle.current_gains(), (1.0, 1.1, 1.0));
        assert!((twiddle.deltas()[0] - 0.09).abs() < EPS);
        assert_eq!(twiddle.phase(), TwiddlePhase::IncreasePending);
        assert_eq!(twiddle.active_index(), 1);
        assert_eq!(twiddle.last_report().unwrap().decision, TwiddleDecision::Reverted);
        assert_eq!(twiddle.windows_completed(), 3);
    }

    #[test]
    fn test_accept_increase() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(4, 0.1)).unwrap();

        feed_window(&mut twiddle, 1.0, 4);
        feed_window(&mut twiddle, 0.5, 4);

        assert_eq!(twiddle.best_error(), 2.0);
        assert!((twiddle.deltas()[0] - 0.11).abs() < EPS);
        assert_eq!(twiddle.active_index(), 1);
        assert_eq!(twiddle.phase(), TwiddlePhase::IncreasePending);
        // k_p keeps its increase, k_i starts its probe straight away
        assert_gains_near(twiddle.current_gains(), (1.1, 1.1, 1.0));
    }

    #[test]
    fn test_accept_increase_deferred() {
        let p = TwiddleParams {
            defer_increase_on_accept: true,
            ..params(4, 0.1)
        };
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &p).unwrap();

        feed_window(&mut twiddle, 1.0, 4);
        feed_window(&mut twiddle, 0.5, 4);

        assert_eq!(twiddle.active_index(), 1);
        assert_gains_near(twiddle.current_gains(), (1.1, 1.0, 1.0));
    }

    #[test]
    fn test_accept_decrease() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(2, 0.1)).unwrap();

        feed_window(&mut twiddle, 1.0, 2);
        feed_window(&mut twiddle, 1.0, 2);
        feed_window(&mut twiddle, 0.25, 2);

        assert_eq!(twiddle.last_report().unwrap().decision, TwiddleDecision::Accepted);
        assert_eq!(twiddle.best_error(), 0.5);
        assert!((twiddle.deltas()[0] - 0.11).abs() < EPS);
        assert_gains_near(twiddle.current_gains(), (0.9, 1.1, 1.0));
        assert_eq!(twiddle.phase(), TwiddlePhase::IncreasePending);
    }

    #[test]
    fn test_active_index_wraps() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(1, 0.0)).unwrap();

        // Baseline then one improving window per gain
        twiddle.observe(10.0);
        for (i, e) in [9.0, 8.0, 7.0].iter().enumerate() {
            assert_eq!(twiddle.active_index(), i);
            twiddle.observe(*e);
        }

        assert_eq!(twiddle.active_index(), 0);
        assert_gains_near(twiddle.current_gains(), (1.21, 1.1, 1.1));
    }

    #[test]
    fn test_reset_pulse() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(3, 0.1)).unwrap();

        twiddle.observe(1.0);
        twiddle.observe(1.0);
        assert!(!twiddle.reset_pulse());

        twiddle.observe(1.0);
        assert!(twiddle.reset_pulse());
        assert!(twiddle.reset_pulse());

        twiddle.observe(1.0);
        assert!(!twiddle.reset_pulse());
    }

    #[test]
    fn test_delta_sum_grows_on_improvement() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 2.0, 3.0), &params(1, 0.0)).unwrap();
        twiddle.observe(100.0);

        let mut error = 100.0;
        for _ in 0..9 {
            let before = twiddle.deltas().sum();
            error *= 0.9;
            twiddle.observe(error);
            assert_eq!(twiddle.last_report().unwrap().decision, TwiddleDecision::Accepted);
            assert!(twiddle.deltas().sum() > before);
        }
    }

    #[test]
    fn test_constant_error_converges() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(5, 0.1)).unwrap();

        let mut prev_sum = twiddle.deltas().sum();
        let mut windows = 0;
        while !twiddle.has_converged() {
            feed_window(&mut twiddle, 2.0, 5);
            windows += 1;

            let sum = twiddle.deltas().sum();
            assert!(sum <= prev_sum);
            prev_sum = sum;

            assert!(windows < 200, "search did not converge");
        }

        assert!(twiddle.deltas().sum() < 0.1);
        // No gain is ever more than one delta away from where it started
        let g = twiddle.current_gains();
        assert!((g.k_p - 1.0).abs() <= 0.1 + EPS);
        assert!((g.k_i - 1.0).abs() <= 0.1 + EPS);
        assert!((g.k_d - 1.0).abs() <= 0.1 + EPS);
    }

    #[test]
    fn test_converged_latches() {
        // Initial delta sum is 0.3, which is already below the tolerance
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(1, 0.35)).unwrap();
        assert!(twiddle.has_converged());

        // Improving windows grow the deltas back over the tolerance
        let mut error = 10.0;
        for _ in 0..7 {
            twiddle.observe(error);
            error -= 1.0;
        }

        assert!(twiddle.deltas().sum() > 0.35);
        assert!(twiddle.has_converged());
    }

    #[test]
    fn test_negative_gain_converges_immediately() {
        // Deltas are (-0.1, 0.0, 0.05), summing below the tolerance
        let mut twiddle = Twiddle::new(Gains::new(-1.0, 0.0, 0.5), &params(1, 0.01)).unwrap();

        assert!(twiddle.deltas()[0] < 0.0);
        assert!(twiddle.has_converged());
        assert_eq!(twiddle.windows_completed(), 0);
    }

    #[test]
    fn test_window_budget() {
        let p = TwiddleParams {
            max_windows: Some(2),
            ..params(2, 0.0)
        };
        let mut twiddle = Twiddle::new(Gains::new(1.0, 1.0, 1.0), &p).unwrap();

        feed_window(&mut twiddle, 1.0, 2);
        assert!(!twiddle.is_exhausted());
        feed_window(&mut twiddle, 1.0, 2);
        assert!(twiddle.is_exhausted());

        let gains = twiddle.current_gains();
        feed_window(&mut twiddle, 0.0, 2);
        assert_eq!(twiddle.current_gains(), gains);
        assert_eq!(twiddle.windows_completed(), 2);
    }

    #[test]
    fn test_zero_gain_is_never_tuned() {
        let mut twiddle = Twiddle::new(Gains::new(1.0, 0.0, 1.0), &params(1, 0.0)).unwrap();

        for _ in 0..12 {
            twiddle.observe(1.0);
        }

        assert_eq!(twiddle.current_gains().k_i, 0.0);
        assert_eq!(twiddle.deltas()[1], 0.0);
    }

    #[test]
    fn test_invalid_setup() {
        assert_eq!(
            Twiddle::new(Gains::new(1.0, 1.0, 1.0), &params(0, 0.1)).unwrap_err(),
            TwiddleError::ZeroWindowLength
        );
        assert_eq!(
            Twiddle::new(Gains::new(std::f64::NAN, 1.0, 1.0), &params(1, 0.1)).unwrap_err(),
            TwiddleError::NonFiniteGains
        );
    }
}
