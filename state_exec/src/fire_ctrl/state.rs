//! Implementations for the fire control state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{FireCtrlError, Params, Table};
use crate::interp::InterpTable;
use crate::pose_est::Pose;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fire control module state
#[derive(Debug, Clone)]
pub struct FireCtrl {
    params: Params,

    primary_target_m: Vector2<f64>,
    secondary_target_m: Vector2<f64>,

    /// Solution from the previous cycle, held when a target's bearing is undefined.
    prev_solution: FiringSolution,
}

/// Input data to fire control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Fused robot pose in the field frame.
    pub pose: Pose,

    /// Field relative robot velocity.
    ///
    /// Units: meters/second
    /// Frame: Field
    pub field_velocity_ms: Vector2<f64>,
}

/// Solution for a single target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TargetSolution {
    /// Heading to aim at. Field relative for the primary target and robot relative for the
    /// secondary target.
    ///
    /// Units: radians
    pub aim_heading_rad: f64,

    /// Rate at which the aim heading is changing due to the robot's motion. Always zero for the
    /// secondary target.
    ///
    /// Units: radians/second
    pub lead_rate_rads: f64,

    /// Shot speed demand.
    ///
    /// Units: radians/second
    pub shot_speed_rads: f64,

    /// Launch arm angle demand.
    ///
    /// Units: radians
    pub arm_angle_rad: f64,

    /// Position the robot will have moved to by the time the shot arrives.
    ///
    /// Units: meters
    /// Frame: Field
    pub effective_position_m: [f64; 2],

    /// Distance from the effective position to the target.
    ///
    /// Units: meters
    pub effective_distance_m: f64,
}

/// Output of fire control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FiringSolution {
    pub primary: TargetSolution,
    pub secondary: TargetSolution,
}

/// Status report for fire control processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// The primary target was too close to the effective position for a bearing to be computed,
    /// the previous aim heading was held.
    pub primary_degenerate: bool,

    /// As `primary_degenerate` but for the secondary target.
    pub secondary_degenerate: bool,

    /// The input velocity was not finite and zero was used instead.
    pub velocity_invalid: bool,
}

/// Shot geometry for one target.
struct Intercept {
    effective_position_m: Vector2<f64>,
    effective_distance_m: f64,

    /// Field relative bearing from the effective position to the target, `None` if the effective
    /// distance is below the minimum or not finite.
    bearing_rad: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FireCtrl {
    /// Create a new fire control instance from the given parameters.
    pub fn new(params: Params) -> Result<Self, FireCtrlError> {
        params.validate()?;

        Ok(Self {
            primary_target_m: Vector2::from(params.primary_target_m),
            secondary_target_m: Vector2::from(params.secondary_target_m),
            params,
            prev_solution: FiringSolution::default(),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Insert or overwrite one point of a calibration table while running.
    ///
    /// Takes effect from the next call to `proc`. Points that would make the table invalid are
    /// rejected and the table is left as it was.
    pub fn tune(&mut self, table: Table, distance_m: f64, value: f64) -> Result<(), FireCtrlError> {
        if table == Table::TimeOfFlight && value < 0.0 {
            return Err(FireCtrlError::NegativeTimeOfFlight(value));
        }

        let t = match table {
            Table::PrimaryShotSpeed => &mut self.params.primary_shot_speed_table,
            Table::PrimaryArmAngle => &mut self.params.primary_arm_angle_table,
            Table::SecondaryShotSpeed => &mut self.params.secondary_shot_speed_table,
            Table::SecondaryArmAngle => &mut self.params.secondary_arm_angle_table,
            Table::TimeOfFlight => &mut self.params.time_of_flight_table,
        };

        t.put(distance_m, value)
            .map_err(|e| FireCtrlError::InvalidTablePoint(table, e))?;

        debug!("Tuned {:?} table: {} m -> {}", table, distance_m, value);

        Ok(())
    }

    /// Compute the firing solution for both targets.
    ///
    /// Depends only on the input and, for degenerate geometry, the previous solution.
    pub fn proc(&mut self, input_data: &InputData) -> (FiringSolution, StatusReport) {
        let mut report = StatusReport::default();

        let velocity_ms = if input_data.field_velocity_ms.iter().all(|v| v.is_finite()) {
            input_data.field_velocity_ms
        } else {
            warn!(
                "Non-finite field velocity ({}, {}), firing without lead",
                input_data.field_velocity_ms[0], input_data.field_velocity_ms[1]
            );
            report.velocity_invalid = true;
            Vector2::zeros()
        };

        let position_m = input_data.pose.position_m;
        let prev = self.prev_solution;

        // ---- PRIMARY ----

        let intercept = self.intercept(&self.primary_target_m, &position_m, &velocity_ms);

        let primary = match intercept.bearing_rad {
            Some(bearing_rad) => {
                // Velocity perpendicular to the aim line, over the distance to the target.
                let lead_rate_rads = (velocity_ms[0] * bearing_rad.sin()
                    - velocity_ms[1] * bearing_rad.cos())
                    / intercept.effective_distance_m;

                Self::solution(
                    &intercept,
                    bearing_rad,
                    lead_rate_rads,
                    &self.params.primary_shot_speed_table,
                    &self.params.primary_arm_angle_table,
                    &prev.primary,
                )
            }
            None => {
                report.primary_degenerate = true;
                Self::solution(
                    &intercept,
                    prev.primary.aim_heading_rad,
                    0.0,
                    &self.params.primary_shot_speed_table,
                    &self.params.primary_arm_angle_table,
                    &prev.primary,
                )
            }
        };

        // ---- SECONDARY ----

        let intercept = self.intercept(&self.secondary_target_m, &position_m, &velocity_ms);

        let aim_heading_rad = match intercept.bearing_rad {
            Some(bearing_rad) => wrap_pi(bearing_rad - input_data.pose.heading_rad),
            None => {
                report.secondary_degenerate = true;
                prev.secondary.aim_heading_rad
            }
        };

        let secondary = Self::solution(
            &intercept,
            aim_heading_rad,
            0.0,
            &self.params.secondary_shot_speed_table,
            &self.params.secondary_arm_angle_table,
            &prev.secondary,
        );

        if report.primary_degenerate || report.secondary_degenerate {
            debug!(
                "Degenerate target geometry (primary: {}, secondary: {}), holding previous aim",
                report.primary_degenerate, report.secondary_degenerate
            );
        }

        let solution = FiringSolution { primary, secondary };

        trace!(
            "FireCtrl output:\n    primary: {:?}\n    secondary: {:?}",
            solution.primary,
            solution.secondary
        );

        self.prev_solution = solution;

        (solution, report)
    }

    /// Lead the robot's position by the time of flight to the target.
    fn intercept(
        &self,
        target_m: &Vector2<f64>,
        position_m: &Vector2<f64>,
        velocity_ms: &Vector2<f64>,
    ) -> Intercept {
        let distance_m = (target_m - position_m).norm();
        let tof_s = self
            .params
            .time_of_flight_table
            .get(distance_m)
            .unwrap_or(0.0);

        let effective_position_m = position_m + velocity_ms * tof_s;
        let to_target_m = target_m - effective_position_m;
        let effective_distance_m = to_target_m.norm();

        let bearing_rad = if effective_distance_m.is_finite()
            && effective_distance_m >= self.params.min_effective_distance_m
        {
            Some(to_target_m[1].atan2(to_target_m[0]))
        } else {
            None
        };

        Intercept {
            effective_position_m,
            effective_distance_m,
            bearing_rad,
        }
    }

    /// Assemble a target solution, looking shot speed and arm angle up at the effective distance.
    ///
    /// Lookups that fail (non-finite distance) hold the previous value.
    fn solution(
        intercept: &Intercept,
        aim_heading_rad: f64,
        lead_rate_rads: f64,
        shot_speed_table: &InterpTable,
        arm_angle_table: &InterpTable,
        prev: &TargetSolution,
    ) -> TargetSolution {
        let dist = intercept.effective_distance_m;

        TargetSolution {
            aim_heading_rad,
            lead_rate_rads,
            shot_speed_rads: shot_speed_table.get(dist).unwrap_or(prev.shot_speed_rads),
            arm_angle_rad: arm_angle_table.get(dist).unwrap_or(prev.arm_angle_rad),
            effective_position_m: [
                intercept.effective_position_m[0],
                intercept.effective_position_m[1],
            ],
            effective_distance_m: dist,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
