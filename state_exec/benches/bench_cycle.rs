//! # Robot State Cycle Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use state_if::{cam::CamPose, CameraReport, CycleInput, ModulePosition, NUM_MODULES};
use state_lib::{
    fire_ctrl,
    interp::InterpTable,
    pose_est,
    robot_state::{Params, RobotState},
};
use util::module::State;

fn table(pairs: &[[f64; 2]]) -> InterpTable {
    InterpTable::from_pairs(pairs).unwrap()
}

fn robot_state_benchmark(c: &mut Criterion) {
    // ---- Build robot state ----

    let params = Params {
        pose_est: pose_est::Params::default(),
        fire_ctrl: fire_ctrl::Params {
            primary_target_m: [0.2417, 5.5479],
            secondary_target_m: [1.8415, 8.2042],
            min_effective_distance_m: 1e-6,
            primary_shot_speed_table: table(&[[0.0, 400.0], [3.0, 550.0], [6.0, 700.0]]),
            primary_arm_angle_table: table(&[[0.0, 0.95], [3.0, 0.55], [6.0, 0.36]]),
            secondary_shot_speed_table: table(&[[0.0, 250.0], [10.0, 550.0]]),
            secondary_arm_angle_table: table(&[[0.0, 0.7]]),
            time_of_flight_table: table(&[[0.0, 0.0], [3.0, 0.22], [6.0, 0.42]]),
        },
    };

    let mut robot_state = RobotState::new(params, None).unwrap();

    // Fill the history so corrections replay a full window
    let mut t = 0.0;
    for i in 0..100 {
        t = i as f64 * 0.02;
        robot_state.proc(&odometry(t, t)).unwrap();
    }

    // ---- Benchmark a cycle with two cameras ----

    c.bench_function("robot_state_cycle", |b| {
        b.iter(|| {
            t += 0.02;
            let mut input = odometry(t, t);
            input.cameras = vec![camera("front", t - 1.0, t), camera("rear", t - 0.05, t)];
            robot_state.proc(black_box(&input)).unwrap()
        })
    });
}

fn odometry(t: f64, dist: f64) -> CycleInput {
    CycleInput {
        timestamp_s: t,
        gyro_heading_rad: 0.1 * t,
        module_positions: [ModulePosition::new(dist, 0.0); NUM_MODULES],
        field_velocity_ms: [1.0, 0.1],
        ..Default::default()
    }
}

fn camera(name: &str, frame_t: f64, x: f64) -> CameraReport {
    CameraReport {
        name: String::from(name),
        target_acquired: true,
        primary_pose: CamPose { x_m: x, y_m: 4.0, heading_rad: 0.0 },
        secondary_pose: CamPose { x_m: x + 0.05, y_m: 4.0, heading_rad: 0.0 },
        frame_timestamp_s: frame_t,
        primary_xy_std_dev_coeff: 0.08,
        secondary_xy_std_dev_coeff: 0.12,
        average_distance_m: 2.5,
        total_targets: 2,
        horizontal_fov_rad: 1.2,
    }
}

criterion_group!(benches, robot_state_benchmark);
criterion_main!(benches);
