//! # Camera Equipment Interface
//!
//! Cameras run their own fiducial pose solving. Each cycle the camera driver reports the latest
//! solution it has, which may be several cycles old by the time it arrives.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A field-frame robot pose as solved by a camera.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamPose {
    pub x_m: f64,
    pub y_m: f64,
    pub heading_rad: f64,
}

/// The report from one camera for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraReport {
    /// Name of the camera, used for logging only
    pub name: String,

    /// True if the camera currently sees at least one target
    pub target_acquired: bool,

    /// The camera's preferred solution (for example a multi-target solve)
    pub primary_pose: CamPose,

    /// The camera's alternative solution (for example a single-target solve)
    pub secondary_pose: CamPose,

    /// Time at which the frame was captured, on the same clock as the cycle timestamp.
    ///
    /// Units: seconds
    pub frame_timestamp_s: f64,

    /// Calibration coefficient scaling the primary solution's uncertainty
    pub primary_xy_std_dev_coeff: f64,

    /// Calibration coefficient scaling the secondary solution's uncertainty
    pub secondary_xy_std_dev_coeff: f64,

    /// Average distance to the detected targets
    ///
    /// Units: meters
    pub average_distance_m: f64,

    /// Number of targets detected in the frame
    pub total_targets: u32,

    /// Horizontal field of view of the camera
    ///
    /// Units: radians
    pub horizontal_fov_rad: f64,
}
