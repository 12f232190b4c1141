//! Implementations for the RobotState structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{InitData, Params, RobotStateError};
use crate::{
    fire_ctrl::{self, FireCtrl},
    pose_est::{Pose, PoseEstimator, VisionCorrection},
    state_pub::{ControlData, StatePublisher, StateReader, Telemetry},
};
use state_if::CycleInput;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Robot state, owned by the cycle driver.
pub struct RobotState {
    pose_est: PoseEstimator,
    fire_ctrl: FireCtrl,
    publisher: StatePublisher,

    telemetry: Telemetry,
    arch_telemetry: Archiver,
}

/// Status report for robot state processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Number of vision corrections applied this cycle.
    pub corrections_accepted: usize,

    /// Number of vision corrections discarded this cycle.
    pub corrections_rejected: usize,

    /// The odometry sample was invalid and the estimator was not propagated.
    pub odometry_rejected: bool,

    pub fire_ctrl: fire_ctrl::StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotState {
    /// Create robot state from already loaded parameters.
    ///
    /// If `session` is `Some` telemetry is archived into it.
    pub fn new(params: Params, session: Option<&Session>) -> Result<Self, RobotStateError> {
        let pose_est = PoseEstimator::new(params.pose_est).map_err(RobotStateError::PoseEstError)?;
        let fire_ctrl = FireCtrl::new(params.fire_ctrl).map_err(RobotStateError::FireCtrlError)?;

        let arch_telemetry = match session {
            Some(s) => Archiver::from_path(s, "robot_state/telemetry.csv")
                .map_err(RobotStateError::ArchiveError)?,
            None => Archiver::default(),
        };

        Ok(Self {
            pose_est,
            fire_ctrl,
            publisher: StatePublisher::new(),
            telemetry: Telemetry::default(),
            arch_telemetry,
        })
    }

    /// Get a reader for the published state, which may be passed to other threads.
    pub fn reader(&self) -> StateReader {
        self.publisher.reader()
    }

    /// Latest fused pose estimate.
    pub fn get_pose(&self) -> Pose {
        self.pose_est.get_estimate()
    }

    /// Latest published control data.
    pub fn get_control_data(&self) -> ControlData {
        *self.publisher.get_control_data()
    }

    /// Reseed the pose estimate, for example at the start of a match, and republish the pose.
    pub fn reset_pose(&mut self, pose: &Pose) {
        self.pose_est.reset(pose);
        self.publisher.publish_pose(self.pose_est.get_estimate());
    }

    /// Tune a fire control calibration table while running.
    pub fn tune_table(
        &mut self,
        table: fire_ctrl::Table,
        distance_m: f64,
        value: f64,
    ) -> Result<(), fire_ctrl::FireCtrlError> {
        self.fire_ctrl.tune(table, distance_m, value)
    }

    /// Apply all corrections from the cycle's camera reports, returning the number accepted and
    /// rejected.
    fn apply_corrections(&mut self, input_data: &CycleInput) -> (usize, usize) {
        let mut accepted = 0;
        let mut rejected = 0;

        for report in input_data.cameras.iter() {
            let corrections = match VisionCorrection::from_report(report) {
                Some(c) => c,
                None => continue,
            };

            for c in corrections.iter() {
                match self
                    .pose_est
                    .correct(&c.observed_pose, c.timestamp_s, c.variance_m2)
                {
                    Ok(_) => accepted += 1,
                    Err(e) => {
                        warn!(
                            "Rejected {:?} correction from camera \"{}\": {}",
                            c.solution, report.name, e
                        );
                        rejected += 1;
                    }
                }
            }
        }

        (accepted, rejected)
    }
}

impl State for RobotState {
    type InitData = InitData;
    type InitError = RobotStateError;

    type InputData = CycleInput;
    type OutputData = ControlData;
    type StatusReport = StatusReport;
    type ProcError = RobotStateError;

    /// Initialise robot state, loading the module parameter files.
    fn init(init_data: Self::InitData, session: Option<&Session>)
        -> Result<Self, Self::InitError>
    {
        let params = Params {
            pose_est: params::load(&init_data.pose_est_params)
                .map_err(RobotStateError::ParamLoadError)?,
            fire_ctrl: params::load(&init_data.fire_ctrl_params)
                .map_err(RobotStateError::ParamLoadError)?,
        };

        let session = if init_data.archive_telemetry {
            session
        } else {
            None
        };

        Self::new(params, session)
    }

    /// Run one cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        // ---- POSE ESTIMATION ----

        let (accepted, rejected) = self.apply_corrections(input_data);
        report.corrections_accepted = accepted;
        report.corrections_rejected = rejected;

        let pose = match self.pose_est.propagate(
            input_data.timestamp_s,
            input_data.gyro_heading_rad,
            &input_data.module_positions,
        ) {
            Ok(p) => p,
            Err(e) => {
                warn!("Odometry sample at {} s rejected: {}", input_data.timestamp_s, e);
                report.odometry_rejected = true;
                self.pose_est.get_estimate()
            }
        };

        // ---- FIRE CONTROL ----

        let (solution, fire_ctrl_report) = self.fire_ctrl.proc(&fire_ctrl::InputData {
            pose,
            field_velocity_ms: Vector2::from(input_data.field_velocity_ms),
        });
        report.fire_ctrl = fire_ctrl_report;

        // ---- PUBLISH ----

        let control_data = ControlData::from_solution(
            &solution,
            input_data.has_object,
            input_data.is_intaking,
            input_data.is_climbed,
        );

        self.publisher.publish(control_data, pose);

        trace!("RobotState output: {:?}", control_data);

        // ---- TELEMETRY ----

        self.telemetry = Telemetry {
            timestamp_s: input_data.timestamp_s,
            pose_x_m: pose.position_m[0],
            pose_y_m: pose.position_m[1],
            pose_heading_rad: pose.heading_rad,
            primary_effective_x_m: solution.primary.effective_position_m[0],
            primary_effective_y_m: solution.primary.effective_position_m[1],
            primary_effective_distance_m: solution.primary.effective_distance_m,
            secondary_effective_x_m: solution.secondary.effective_position_m[0],
            secondary_effective_y_m: solution.secondary.effective_position_m[1],
            secondary_effective_distance_m: solution.secondary.effective_distance_m,
            primary_aim_rad: control_data.primary_aim_rad,
            primary_lead_rate_rads: control_data.primary_lead_rate_rads,
            primary_shot_speed_rads: control_data.primary_shot_speed_rads,
            primary_arm_angle_rad: control_data.primary_arm_angle_rad,
            secondary_aim_rad: control_data.secondary_aim_rad,
            secondary_shot_speed_rads: control_data.secondary_shot_speed_rads,
            secondary_arm_angle_rad: control_data.secondary_arm_angle_rad,
            has_object: control_data.has_object,
            is_intaking: control_data.is_intaking,
            is_climbed: control_data.is_climbed,
            rio_bus_utilisation: input_data.bus_diag.rio_bus_utilisation,
            canivore_bus_utilisation: input_data.bus_diag.canivore_bus_utilisation,
            corrections_accepted: accepted,
            corrections_rejected: rejected,
        };

        self.write().map_err(RobotStateError::ArchiveError)?;

        Ok((control_data, report))
    }
}

impl Archived for RobotState {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_telemetry.serialise(self.telemetry)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
