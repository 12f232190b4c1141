//! # Robot state library.
//!
//! This library allows other crates in the workspace, and the integration tests and benchmarks, to
//! access items defined inside the robot state crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - owns all state for the executable
pub mod data_store;

/// Fire control - computes aim, shot speed and arm angle for the field targets while moving
pub mod fire_ctrl;

/// Interpolation tables used for calibration data
pub mod interp;

/// Executable parameters
pub mod params;

/// Pose estimation - fuses swerve odometry, gyro and latency-compensated vision
pub mod pose_est;

/// Robot state - runs estimation, fire control and publishing as a single cycle
pub mod robot_state;

/// State publisher - lock-protected snapshots of the latest outputs for other threads
pub mod state_pub;
