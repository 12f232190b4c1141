//! # Cyclic modules
//!
//! An executable is built from modules which are created once and then processed once per cycle,
//! always from the same thread. Every such module implements [`State`].
//!
//! A module's `proc` should only fail for problems the executable must hear about. Bad
//! measurements and other per-cycle problems belong in the status report.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module processed once per cycle.
pub trait State: Sized {
    /// What the module is built from, usually parameter file names.
    type InitData;
    type InitError;

    /// Inputs for one cycle.
    type InputData;
    /// Outputs of one cycle.
    type OutputData;
    /// Summary of anything noteworthy that happened during the cycle.
    type StatusReport;
    type ProcError;

    /// Build the module.
    ///
    /// With no `session` (in tests for example) the module shall not archive anything.
    fn init(init_data: Self::InitData, session: Option<&Session>)
        -> Result<Self, Self::InitError>;

    /// Run one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
