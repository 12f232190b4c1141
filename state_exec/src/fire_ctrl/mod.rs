//! # Fire control module
//!
//! Fire control computes where to aim, how fast to shoot and where to put the launch arm for the
//! two field targets, while the robot is moving.
//!
//! A projectile released now does not leave with the robot's current position. Fire control uses a
//! first order lead: it looks up the time of flight for the current distance to the target and
//! moves the robot along its current velocity for that long. The result is the effective aiming
//! position. All further calculations (heading, shot speed, arm angle) use the effective aiming
//! position and the effective distance from it to the target.
//!
//! For the primary target the part of the robot's velocity perpendicular to the aim line makes the
//! target appear to rotate about the robot. Dividing it by the effective distance gives the
//! angular lead-rate, which the heading controller feeds forward. The secondary target has no
//! lead-rate and its aim heading is relative to the robot's heading rather than the field, as its
//! release mechanism is fixed to the robot body.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The calibration tables, used to pick one for live tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    PrimaryShotSpeed,
    PrimaryArmAngle,
    SecondaryShotSpeed,
    SecondaryArmAngle,
    TimeOfFlight,
}

/// Possible errors that can occur while setting up fire control.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FireCtrlError {
    #[error("The {0} table is empty")]
    EmptyTable(&'static str),

    #[error("The time of flight table must start at or below zero distance, starts at {0} m")]
    TimeOfFlightNotDefinedAtZero(f64),

    #[error("The time of flight table contains a negative time ({0} s)")]
    NegativeTimeOfFlight(f64),

    #[error("The {0} target position is not finite")]
    InvalidTarget(&'static str),

    #[error("The minimum effective distance must be finite and non-negative, found {0}")]
    InvalidMinDistance(f64),

    #[error("Cannot tune the {0:?} table: {1}")]
    InvalidTablePoint(Table, crate::interp::InterpError),
}
