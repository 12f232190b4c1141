//! # State Executable Parameters
//!
//! This module provide parameters for the state executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use util::logger::LogSettings;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct StateExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// If true the cycle's telemetry is archived into the session directory.
    pub archive_telemetry: bool,

    /// Pose estimator parameter file, relative to the params directory.
    pub pose_est_params: String,

    /// Fire control parameter file, relative to the params directory.
    pub fire_ctrl_params: String,

    /// Number of consecutive cycle overruns after which the executable stops. Zero disables the
    /// limit.
    #[serde(default)]
    pub max_consec_cycle_overruns: u64,

    /// Logger settings, the `[log]` table.
    #[serde(default)]
    pub log: LogSettings,
}
