//! # Robot state module
//!
//! Robot state ties the pose estimator, fire control and the state publisher together into a
//! single cycle. Each cycle:
//!
//! 1. Every camera report with a detection is turned into corrections (secondary solution first)
//!    and applied to the estimator. Rejected corrections are logged and skipped.
//! 2. The estimator is propagated with the cycle's odometry.
//! 3. Fire control computes the firing solution from the fused pose and the field velocity.
//! 4. The control data and pose are published and the cycle's telemetry is archived.
//!
//! Nothing in the cycle is fatal except failing to write the telemetry archive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

pub use state::*;

use crate::{fire_ctrl, pose_est};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for all modules owned by robot state.
#[derive(Debug, Clone)]
pub struct Params {
    pub pose_est: pose_est::Params,
    pub fire_ctrl: fire_ctrl::Params,
}

/// Data needed to initialise robot state from parameter files.
#[derive(Debug, Clone, Deserialize)]
pub struct InitData {
    /// Pose estimator parameter file, relative to the params directory.
    pub pose_est_params: String,

    /// Fire control parameter file, relative to the params directory.
    pub fire_ctrl_params: String,

    /// If false no telemetry archive is written, even inside a session.
    pub archive_telemetry: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RobotStateError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not create the pose estimator: {0}")]
    PoseEstError(pose_est::PoseEstError),

    #[error("Could not create fire control: {0}")]
    FireCtrlError(fire_ctrl::FireCtrlError),

    #[error("Could not archive telemetry: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
