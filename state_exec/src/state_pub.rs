//! # State publisher
//!
//! The latest control data and fused pose are published as immutable snapshots. The cycle
//! replaces the snapshot each cycle, readers on any thread take a reference-counted copy of
//! whatever was last published. A reader therefore never sees a half-written snapshot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::fire_ctrl::FiringSolution;
use crate::pose_est::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Demands for the mechanism and heading controllers, replaced wholesale every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlData {
    /// Field relative heading to aim at the primary target.
    ///
    /// Units: radians
    pub primary_aim_rad: f64,

    /// Feed-forward rate for the primary aim heading.
    ///
    /// Units: radians/second
    pub primary_lead_rate_rads: f64,

    /// Units: radians/second
    pub primary_shot_speed_rads: f64,

    /// Units: radians
    pub primary_arm_angle_rad: f64,

    /// Robot relative heading to aim at the secondary target.
    ///
    /// Units: radians
    pub secondary_aim_rad: f64,

    /// Units: radians/second
    pub secondary_shot_speed_rads: f64,

    /// Units: radians
    pub secondary_arm_angle_rad: f64,

    pub has_object: bool,
    pub is_intaking: bool,
    pub is_climbed: bool,
}

/// One cycle's telemetry record.
///
/// Kept flat so it can be written as a single CSV row.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Telemetry {
    pub timestamp_s: f64,

    pub pose_x_m: f64,
    pub pose_y_m: f64,
    pub pose_heading_rad: f64,

    pub primary_effective_x_m: f64,
    pub primary_effective_y_m: f64,
    pub primary_effective_distance_m: f64,
    pub secondary_effective_x_m: f64,
    pub secondary_effective_y_m: f64,
    pub secondary_effective_distance_m: f64,

    pub primary_aim_rad: f64,
    pub primary_lead_rate_rads: f64,
    pub primary_shot_speed_rads: f64,
    pub primary_arm_angle_rad: f64,
    pub secondary_aim_rad: f64,
    pub secondary_shot_speed_rads: f64,
    pub secondary_arm_angle_rad: f64,
    pub has_object: bool,
    pub is_intaking: bool,
    pub is_climbed: bool,

    pub rio_bus_utilisation: f64,
    pub canivore_bus_utilisation: f64,

    pub corrections_accepted: usize,
    pub corrections_rejected: usize,
}

/// Writing end of the published state.
///
/// There shall be a single publisher, owned by the cycle.
#[derive(Debug, Default)]
pub struct StatePublisher {
    shared: Arc<Shared>,
}

/// Reading end of the published state, cheap to clone and safe to send to other threads.
#[derive(Debug, Clone)]
pub struct StateReader {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    control_data: RwLock<Arc<ControlData>>,
    pose: RwLock<Arc<Pose>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlData {
    /// Build the control data from a firing solution and the pass-through flags.
    pub fn from_solution(
        solution: &FiringSolution,
        has_object: bool,
        is_intaking: bool,
        is_climbed: bool,
    ) -> Self {
        Self {
            primary_aim_rad: solution.primary.aim_heading_rad,
            primary_lead_rate_rads: solution.primary.lead_rate_rads,
            primary_shot_speed_rads: solution.primary.shot_speed_rads,
            primary_arm_angle_rad: solution.primary.arm_angle_rad,
            secondary_aim_rad: solution.secondary.aim_heading_rad,
            secondary_shot_speed_rads: solution.secondary.shot_speed_rads,
            secondary_arm_angle_rad: solution.secondary.arm_angle_rad,
            has_object,
            is_intaking,
            is_climbed,
        }
    }
}

impl StatePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a new reader for the published state.
    pub fn reader(&self) -> StateReader {
        StateReader {
            shared: self.shared.clone(),
        }
    }

    /// Replace the published control data and pose.
    pub fn publish(&self, control_data: ControlData, pose: Pose) {
        self.publish_control_data(control_data);
        self.publish_pose(pose);
    }

    pub fn publish_control_data(&self, control_data: ControlData) {
        let snapshot = Arc::new(control_data);
        match self.shared.control_data.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    pub fn publish_pose(&self, pose: Pose) {
        let snapshot = Arc::new(pose);
        match self.shared.pose.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    pub fn get_control_data(&self) -> Arc<ControlData> {
        self.shared.get_control_data()
    }

    pub fn get_pose(&self) -> Arc<Pose> {
        self.shared.get_pose()
    }
}

impl StateReader {
    /// Get the latest published control data.
    pub fn get_control_data(&self) -> Arc<ControlData> {
        self.shared.get_control_data()
    }

    /// Get the latest published fused pose.
    pub fn get_pose(&self) -> Arc<Pose> {
        self.shared.get_pose()
    }
}

impl Shared {
    // A poisoned lock still holds a complete snapshot since writers only swap the `Arc`.

    fn get_control_data(&self) -> Arc<ControlData> {
        match self.control_data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn get_pose(&self) -> Arc<Pose> {
        match self.pose.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
