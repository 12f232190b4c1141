//! # Drive Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of swerve modules on the robot, ordered front-left, front-right, back-left, back-right.
pub const NUM_MODULES: usize = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position of a single swerve module as read from its encoders.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Accumulated distance driven by the wheel.
    ///
    /// Units: meters
    pub distance_m: f64,

    /// Steer angle of the module in the robot body frame, counter-clockwise positive.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

impl ModulePosition {
    pub fn new(distance_m: f64, angle_rad: f64) -> Self {
        Self {
            distance_m,
            angle_rad,
        }
    }

    /// Returns true if both the distance and angle are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.distance_m.is_finite() && self.angle_rad.is_finite()
    }
}
