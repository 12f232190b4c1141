//! Integration tests running robot state over whole scenarios

use approx::assert_abs_diff_eq;
use state_if::{cam::CamPose, CameraReport, CycleInput, ModulePosition, NUM_MODULES};
use state_lib::{
    fire_ctrl,
    pose_est::{self, Pose},
    robot_state::{Params, RobotState},
};
use util::{
    module::State,
    script_interpreter::{Pending, ScriptInterpreter},
};

const FIRE_CTRL_PARAMS: &str = r#"
primary_target_m = [5.0, 0.0]
secondary_target_m = [0.0, 5.0]

primary_shot_speed_table = [[0.0, 300.0], [10.0, 500.0]]
primary_arm_angle_table = [[0.0, 1.0], [10.0, 0.2]]
secondary_shot_speed_table = [[0.0, 200.0], [10.0, 300.0]]
secondary_arm_angle_table = [[0.0, 0.7]]
time_of_flight_table = [[0.0, 0.0], [5.0, 0.2], [10.0, 0.4]]
"#;

fn params() -> Params {
    Params {
        pose_est: pose_est::Params::default(),
        fire_ctrl: util::params::from_str::<fire_ctrl::Params>(FIRE_CTRL_PARAMS).unwrap(),
    }
}

fn odometry(t: f64, dist: f64, heading: f64) -> CycleInput {
    CycleInput {
        timestamp_s: t,
        gyro_heading_rad: heading,
        module_positions: [ModulePosition::new(dist, 0.0); NUM_MODULES],
        ..Default::default()
    }
}

fn camera(t: f64, x: f64, y: f64) -> CameraReport {
    CameraReport {
        name: String::from("front"),
        target_acquired: true,
        primary_pose: CamPose { x_m: x, y_m: y, heading_rad: 0.0 },
        secondary_pose: CamPose { x_m: x, y_m: y, heading_rad: 0.0 },
        frame_timestamp_s: t,
        primary_xy_std_dev_coeff: 0.1,
        secondary_xy_std_dev_coeff: 0.1,
        average_distance_m: 1.0,
        total_targets: 1,
        horizontal_fov_rad: 1.0,
    }
}

/// Stationary at the origin facing the primary target.
#[test]
fn test_stationary_scenario() {
    let mut rs = RobotState::new(params(), None).unwrap();

    let (data, report) = rs.proc(&odometry(0.0, 0.0, 0.0)).unwrap();

    assert!(!report.fire_ctrl.primary_degenerate);
    assert_abs_diff_eq!(data.primary_aim_rad, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(data.primary_lead_rate_rads, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(data.primary_shot_speed_rads, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(data.primary_arm_angle_rad, 0.6, epsilon = 1e-9);
}

/// Moving sideways past the primary target leads the aim.
#[test]
fn test_moving_scenario() {
    let mut rs = RobotState::new(params(), None).unwrap();

    let mut input = odometry(0.0, 0.0, 0.0);
    input.field_velocity_ms = [0.0, 1.0];

    let (data, _) = rs.proc(&input).unwrap();

    assert_abs_diff_eq!(data.primary_aim_rad.to_degrees(), -2.29, epsilon = 1e-2);
    assert!(data.primary_lead_rate_rads < 0.0);
    assert_abs_diff_eq!(data.secondary_aim_rad, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
}

/// Identical input sequences give identical outputs.
#[test]
fn test_deterministic() {
    let run = || {
        let mut rs = RobotState::new(params(), None).unwrap();
        let mut outputs = Vec::new();
        for i in 0..50 {
            let t = i as f64 * 0.02;
            let mut input = odometry(t, 0.5 * t, 0.1 * t);
            input.field_velocity_ms = [0.5, 0.2];
            if i % 10 == 5 {
                input.cameras = vec![camera(t - 0.04, 0.5 * t + 0.2, 0.1)];
            }
            outputs.push(rs.proc(&input).unwrap().0);
        }
        (outputs, rs.get_pose())
    };

    let (a, pose_a) = run();
    let (b, pose_b) = run();

    assert_eq!(a, b);
    assert_eq!(pose_a, pose_b);
}

/// A late camera frame moves the current estimate by replaying the motion since the frame.
#[test]
fn test_delayed_vision() {
    let mut rs = RobotState::new(params(), None).unwrap();

    for i in 0..=10 {
        let t = i as f64 * 0.1;
        rs.proc(&odometry(t, 0.1 * i as f64, 0.0)).unwrap();
    }
    assert_abs_diff_eq!(rs.get_pose().position_m[0], 1.0, epsilon = 1e-9);

    // Both solutions report y = 0.4 at t = 0.5, each halving the remaining error.
    let mut input = odometry(1.1, 1.1, 0.0);
    input.cameras = vec![camera(0.5, 0.5, 0.4)];
    let (_, report) = rs.proc(&input).unwrap();

    assert_eq!(report.corrections_accepted, 2);
    let pose = rs.get_pose();
    assert_abs_diff_eq!(pose.position_m[0], 1.1, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.position_m[1], 0.3, epsilon = 1e-9);
}

/// A camera with no targets is ignored.
#[test]
fn test_no_targets_ignored() {
    let mut rs = RobotState::new(params(), None).unwrap();
    rs.proc(&odometry(0.0, 0.0, 0.0)).unwrap();

    let mut report = camera(0.0, 3.0, 3.0);
    report.total_targets = 0;

    let mut input = odometry(0.02, 0.0, 0.0);
    input.cameras = vec![report];
    let (_, status) = rs.proc(&input).unwrap();

    assert_eq!(status.corrections_accepted, 0);
    assert_eq!(status.corrections_rejected, 0);
    assert_eq!(rs.get_pose(), Pose::default());
}

/// Reseeding the pose mid-run continues from the new pose.
#[test]
fn test_reset_mid_run() {
    let mut rs = RobotState::new(params(), None).unwrap();
    rs.proc(&odometry(0.0, 0.0, 0.0)).unwrap();
    rs.proc(&odometry(0.02, 0.5, 0.0)).unwrap();

    rs.reset_pose(&Pose::new(2.0, 1.0, std::f64::consts::FRAC_PI_2));
    rs.proc(&odometry(0.04, 1.0, 0.0)).unwrap();

    let pose = rs.get_pose();
    assert_abs_diff_eq!(pose.position_m[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.position_m[1], 1.5, epsilon = 1e-9);
    assert_abs_diff_eq!(pose.heading_rad, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
}

/// Cycle inputs can be replayed from a script.
#[test]
fn test_script_replay() {
    let script = r#"
        0.00: {"timestamp_s": 0.0, "gyro_heading_rad": 0.0, "module_positions": [{"distance_m": 0.0, "angle_rad": 0.0}, {"distance_m": 0.0, "angle_rad": 0.0}, {"distance_m": 0.0, "angle_rad": 0.0}, {"distance_m": 0.0, "angle_rad": 0.0}], "field_velocity_ms": [0.0, 0.0]};
        0.02: {"timestamp_s": 0.02, "gyro_heading_rad": 0.0, "module_positions": [{"distance_m": 0.5, "angle_rad": 0.0}, {"distance_m": 0.5, "angle_rad": 0.0}, {"distance_m": 0.5, "angle_rad": 0.0}, {"distance_m": 0.5, "angle_rad": 0.0}], "field_velocity_ms": [0.0, 0.0], "has_object": true};
    "#;

    let mut si: ScriptInterpreter<CycleInput> = ScriptInterpreter::from_str(script).unwrap();
    let mut rs = RobotState::new(params(), None).unwrap();

    let mut last = None;
    while let Pending::Some(inputs) = si.get_pending(1.0) {
        for input in inputs.iter() {
            last = Some(rs.proc(input).unwrap().0);
        }
    }

    assert!(last.map(|d| d.has_object).unwrap_or(false));
    assert_abs_diff_eq!(rs.get_pose().position_m[0], 0.5, epsilon = 1e-9);
}
