//! # State interface crate.
//!
//! Provides the structures exchanged between the robot state core and the
//! equipment drivers which feed it (drive modules, gyro, cameras).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Swerve drive equipment data
pub mod drive;

/// Vision camera equipment data
pub mod cam;

/// The bundle of inputs sampled once per cycle
pub mod cycle;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use cam::CameraReport;
pub use cycle::{BusDiagnostics, CycleInput, CycleInputError};
pub use drive::{ModulePosition, NUM_MODULES};
