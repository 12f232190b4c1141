//! Pose estimator parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use state_if::NUM_MODULES;

use super::PoseEstError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pose estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Position of each swerve module relative to the robot centre, X forward, Y left. Order is
    /// front-left, front-right, back-left, back-right.
    ///
    /// Units: meters
    /// Frame: Robot body
    pub module_locations_m_rb: [[f64; 2]; NUM_MODULES],

    // ---- FUSION ----

    /// Standard deviation of the odometry in the field X and Y axes. Larger values trust vision
    /// more.
    ///
    /// Units: meters
    pub odom_std_dev_m: [f64; 2],

    /// How far back in time a correction may be applied.
    ///
    /// Units: seconds
    pub history_window_s: f64,

    /// Maximum number of samples held in the history.
    pub history_capacity: usize,

    /// How far a correction's capture time may be ahead of the newest odometry sample, to allow
    /// for skew between the camera and robot clocks. Corrections within this are applied at the
    /// newest sample, later ones are rejected.
    ///
    /// Units: seconds
    #[serde(default = "default_max_future_correction_s")]
    pub max_future_correction_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            module_locations_m_rb: [
                [0.29, 0.29],
                [0.29, -0.29],
                [-0.29, 0.29],
                [-0.29, -0.29]
            ],
            odom_std_dev_m: [0.1, 0.1],
            history_window_s: 1.5,
            history_capacity: 128,
            max_future_correction_s: default_max_future_correction_s(),
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), PoseEstError> {
        if self.odom_std_dev_m.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(PoseEstError::InvalidParams(format!(
                "odom_std_dev_m must be finite and non-negative, found {:?}",
                self.odom_std_dev_m
            )));
        }

        if !self.history_window_s.is_finite() || self.history_window_s <= 0.0 {
            return Err(PoseEstError::InvalidParams(format!(
                "history_window_s must be positive, found {}",
                self.history_window_s
            )));
        }

        if self.history_capacity < 2 {
            return Err(PoseEstError::InvalidParams(format!(
                "history_capacity must be at least 2, found {}",
                self.history_capacity
            )));
        }

        if !self.max_future_correction_s.is_finite() || self.max_future_correction_s < 0.0 {
            return Err(PoseEstError::InvalidParams(format!(
                "max_future_correction_s must be finite and non-negative, found {}",
                self.max_future_correction_s
            )));
        }

        if self.module_locations_m_rb.iter().flatten().any(|v| !v.is_finite()) {
            return Err(PoseEstError::InvalidParams(String::from(
                "module_locations_m_rb must be finite"
            )));
        }

        Ok(())
    }
}

fn default_max_future_correction_s() -> f64 {
    0.02
}
