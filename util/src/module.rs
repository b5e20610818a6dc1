//! Cyclic module interface
//!
//! A cyclic module is initialised once from its parameter file and then
//! driven one cycle at a time by the executable's main loop. `SteerCtrl` is
//! the module of this kind: each cycle it takes one cross-track error and
//! returns one steering command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module driven once per control cycle.
///
/// `init` may be called again to restart the module from fresh parameters,
/// any state from the previous run is discarded.
pub trait State {
    /// Parameter file location and any overrides given on the command line.
    type InitData;
    type InitError;

    /// The measurement taken this cycle.
    type InputData;
    /// The demand to apply this cycle, plus any request to the loop (such
    /// as resetting the run).
    type OutputData;
    /// Per-cycle telemetry, also written to the module's archive.
    type StatusReport;
    type ProcError;

    /// Load parameters and open any archives in `session`.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process a single cycle.
    ///
    /// An error leaves the module in its state from before the call, so the
    /// loop may skip the cycle and carry on.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
