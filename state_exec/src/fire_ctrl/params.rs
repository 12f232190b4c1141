//! Fire control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::FireCtrlError;
use crate::interp::InterpTable;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for fire control.
///
/// Tables are given as lists of `[distance, value]` pairs, with distances in meters.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- TARGETS ----

    /// Position of the primary target, already mirrored for the current alliance.
    ///
    /// Units: meters
    /// Frame: Field
    pub primary_target_m: [f64; 2],

    /// Position of the secondary (feed) target, already mirrored for the current alliance.
    ///
    /// Units: meters
    /// Frame: Field
    pub secondary_target_m: [f64; 2],

    /// Below this effective distance the bearing to a target is undefined and the previous aim
    /// heading is held.
    ///
    /// Units: meters
    #[serde(default = "default_min_effective_distance_m")]
    pub min_effective_distance_m: f64,

    // ---- CALIBRATION ----

    /// Primary shot speed against distance.
    ///
    /// Units: radians/second
    pub primary_shot_speed_table: InterpTable,

    /// Primary launch arm angle against distance.
    ///
    /// Units: radians
    pub primary_arm_angle_table: InterpTable,

    /// Secondary shot speed against distance.
    ///
    /// Units: radians/second
    pub secondary_shot_speed_table: InterpTable,

    /// Secondary launch arm angle against distance.
    ///
    /// Units: radians
    pub secondary_arm_angle_table: InterpTable,

    /// Time between commanding a shot and it arriving, against distance. Must be defined at zero.
    ///
    /// Units: seconds
    pub time_of_flight_table: InterpTable,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), FireCtrlError> {
        let tables = [
            ("primary shot speed", &self.primary_shot_speed_table),
            ("primary arm angle", &self.primary_arm_angle_table),
            ("secondary shot speed", &self.secondary_shot_speed_table),
            ("secondary arm angle", &self.secondary_arm_angle_table),
            ("time of flight", &self.time_of_flight_table),
        ];

        for (name, table) in tables.iter() {
            if table.is_empty() {
                return Err(FireCtrlError::EmptyTable(*name));
            }
        }

        match self.time_of_flight_table.min_input() {
            Some(d) if d > 0.0 => return Err(FireCtrlError::TimeOfFlightNotDefinedAtZero(d)),
            _ => (),
        }

        if let Some((_, t)) = self.time_of_flight_table.iter().find(|(_, t)| *t < 0.0) {
            return Err(FireCtrlError::NegativeTimeOfFlight(t));
        }

        if !self.primary_target_m.iter().all(|v| v.is_finite()) {
            return Err(FireCtrlError::InvalidTarget("primary"));
        }
        if !self.secondary_target_m.iter().all(|v| v.is_finite()) {
            return Err(FireCtrlError::InvalidTarget("secondary"));
        }

        if !self.min_effective_distance_m.is_finite() || self.min_effective_distance_m < 0.0 {
            return Err(FireCtrlError::InvalidMinDistance(self.min_effective_distance_m));
        }

        Ok(())
    }
}

fn default_min_effective_distance_m() -> f64 {
    1e-6
}
