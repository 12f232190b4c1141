//! Main robot state executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Cycle input acquisition from the input script
//!         - Robot state processing:
//!             - Vision corrections
//!             - Odometry propagation
//!             - Fire control
//!             - Publishing and telemetry
//!         - Cycle management
//!
//! Published state is read from a separate monitor thread, in the same way the mechanism
//! controllers read it on the robot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use state_if::CycleInput;
use state_lib::{
    data_store::DataStore,
    params::StateExecParams,
    robot_state::{self, RobotState},
    state_pub::StateReader,
};
use util::{
    logger::logger_init,
    module::State,
    script_interpreter::{Pending, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the published state monitor.
const MONITOR_PERIOD_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("state_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // ---- LOAD PARAMETERS ----

    let exec_params: StateExecParams = util::params::load("state_exec.toml")
        .wrap_err("Could not load exec params")?;

    // Initialise logger
    logger_init(&exec_params.log, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot State Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "Cycle period must be positive, found {} s",
            exec_params.cycle_period_s
        ));
    }

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    info!("Exec parameters loaded");

    // ---- LOAD SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected a single argument (the input script path), found {}",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    let mut script: ScriptInterpreter<CycleInput> =
        ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    info!(
        "Loaded {:?}, lasts {:.02} s and contains {} cycle inputs\n",
        script.get_path(),
        script.get_duration(),
        script.get_num_entries()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let robot_state = RobotState::init(
        robot_state::InitData {
            pose_est_params: exec_params.pose_est_params.clone(),
            fire_ctrl_params: exec_params.fire_ctrl_params.clone(),
            archive_telemetry: exec_params.archive_telemetry,
        },
        Some(&session),
    )
    .wrap_err("Failed to initialise RobotState")?;
    info!("RobotState init complete");

    let mut ds = DataStore::new(robot_state);

    info!("Module initialisation complete\n");

    // ---- START MONITOR ----

    let stop = Arc::new(AtomicBool::new(false));
    let monitor = {
        let reader = ds.robot_state.reader();
        let stop = stop.clone();
        thread::Builder::new()
            .name(String::from("state_monitor"))
            .spawn(move || monitor(reader, stop))
            .wrap_err("Failed to start the state monitor")?
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let loop_start_instant = Instant::now();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(
            cycle_frequency_hz,
            (cycle_start_instant - loop_start_instant).as_secs_f64(),
        );

        // ---- DATA INPUT ----

        match script.get_pending(ds.loop_time_s) {
            Pending::None => (),
            Pending::Some(inputs) => ds.robot_state_input = inputs,
            // Exit if end of script reached
            Pending::EndOfScript => {
                info!("End of input script reached, stopping");
                break;
            }
        }

        // ---- ROBOT STATE PROCESSING ----

        // Several inputs may be due if the previous cycle overran, process them all in order.
        for input in ds.robot_state_input.iter() {
            match ds.robot_state.proc(input) {
                Ok((o, r)) => {
                    ds.robot_state_output = o;
                    ds.robot_state_status_rpt = r;
                    ds.num_rejected_corrections += r.corrections_rejected;
                }
                Err(e) => warn!("Error during RobotState processing: {}", e),
            }
        }

        if ds.is_1_hz_cycle && ds.num_rejected_corrections > 0 {
            info!(
                "{} vision corrections rejected in the last second",
                ds.num_rejected_corrections
            );
            ds.num_rejected_corrections = 0;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;

                if exec_params.max_consec_cycle_overruns > 0
                    && ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns
                {
                    stop.store(true, Ordering::Relaxed);
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    stop.store(true, Ordering::Relaxed);
    if monitor.join().is_err() {
        warn!("State monitor thread panicked");
    }

    info!("Final pose: {:?}", ds.robot_state.get_pose());
    info!("End of execution after {} cycles", ds.num_cycles);

    Ok(())
}

/// Periodically log the published state until `stop` is set.
fn monitor(reader: StateReader, stop: Arc<AtomicBool>) {
    let period = Duration::from_secs_f64(MONITOR_PERIOD_S);
    let tick = Duration::from_millis(50);
    let mut last = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        if last.elapsed() >= period {
            last = Instant::now();

            let pose = reader.get_pose();
            let data = reader.get_control_data();

            info!(
                "Pose ({:.3}, {:.3}, {:.3}), primary aim {:.3} rad at {:.1} rad/s, \
                secondary aim {:.3} rad at {:.1} rad/s",
                pose.position_m[0],
                pose.position_m[1],
                pose.heading_rad,
                data.primary_aim_rad,
                data.primary_shot_speed_rads,
                data.secondary_aim_rad,
                data.secondary_shot_speed_rads
            );
        }

        thread::sleep(tick);
    }
}
