//! # Cycle Input Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CameraReport, ModulePosition, NUM_MODULES};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Everything the state core needs for one cycle, already sampled by the drivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    /// Time at which the drive sensors were sampled.
    ///
    /// Units: seconds
    pub timestamp_s: f64,

    /// Gyro heading, counter-clockwise positive.
    ///
    /// Units: radians
    pub gyro_heading_rad: f64,

    /// Positions of the swerve modules
    pub module_positions: [ModulePosition; NUM_MODULES],

    /// Reports from every camera, in a fixed order
    #[serde(default)]
    pub cameras: Vec<CameraReport>,

    /// Robot velocity in the field frame.
    ///
    /// Units: meters/second
    pub field_velocity_ms: [f64; 2],

    /// True if the robot is holding a game object
    #[serde(default)]
    pub has_object: bool,

    /// True if the intake is running
    #[serde(default)]
    pub is_intaking: bool,

    /// True if the climber has locked the mechanism
    #[serde(default)]
    pub is_climbed: bool,

    /// Bus diagnostics, archived but not used in any calculation
    #[serde(default)]
    pub bus_diag: BusDiagnostics,
}

/// Utilisation of the two CAN buses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BusDiagnostics {
    /// Fraction of the main controller's bus in use, between 0 and 1
    pub rio_bus_utilisation: f64,

    /// Fraction of the CAN FD bus in use, between 0 and 1
    pub canivore_bus_utilisation: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum CycleInputError {
    #[error("Cycle input contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CycleInput {
    /// Parse a cycle input from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, CycleInputError> {
        serde_json::from_str(json_str).map_err(CycleInputError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "timestamp_s": 1.25,
            "gyro_heading_rad": 0.5,
            "module_positions": [
                {"distance_m": 0.1, "angle_rad": 0.0},
                {"distance_m": 0.1, "angle_rad": 0.0},
                {"distance_m": 0.1, "angle_rad": 0.0},
                {"distance_m": 0.1, "angle_rad": 0.0}
            ],
            "field_velocity_ms": [1.0, -0.5],
            "has_object": true
        }"#;

        let input = CycleInput::from_json(json).unwrap();

        assert_eq!(input.timestamp_s, 1.25);
        assert_eq!(input.module_positions[2], ModulePosition::new(0.1, 0.0));
        assert!(input.cameras.is_empty());
        assert!(input.has_object);
        assert!(!input.is_climbed);
        assert_eq!(input.bus_diag, BusDiagnostics::default());

        assert!(CycleInput::from_json("{\"timestamp_s\": 1.0}").is_err());
    }
}
