//! # Data Store

use state_if::CycleInput;

use crate::{
    robot_state::{self, RobotState},
    state_pub::ControlData,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Time since the start of the main loop
    pub loop_time_s: f64,

    // RobotState
    pub robot_state: RobotState,
    pub robot_state_input: Vec<CycleInput>,
    pub robot_state_output: ControlData,
    pub robot_state_status_rpt: robot_state::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of corrections rejected since the last 1Hz report
    pub num_rejected_corrections: usize,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(robot_state: RobotState) -> Self {
        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            loop_time_s: 0.0,
            robot_state,
            robot_state_input: Vec::new(),
            robot_state_output: ControlData::default(),
            robot_state_status_rpt: robot_state::StatusReport::default(),
            num_consec_cycle_overruns: 0,
            num_rejected_corrections: 0,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, loop_time_s: f64) {
        let cycles_per_second = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_second == 0;

        self.robot_state_input.clear();
        self.robot_state_status_rpt = robot_state::StatusReport::default();

        self.loop_time_s = loop_time_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
