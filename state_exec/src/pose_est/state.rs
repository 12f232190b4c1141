//! Pose estimator state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use state_if::{ModulePosition, NUM_MODULES};
use util::maths::{ang_dist, wrap_pi};

// Internal
use super::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fuses swerve odometry and delayed vision corrections into one pose.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    params: Params,

    kinematics: SwerveKinematics,

    /// Kalman gain applied to corrections in X and Y is `q / (q + sqrt(q * r))`, this is `q`.
    odom_variance_m2: [f64; 2],

    /// Pose from odometry alone
    odom_pose: Pose,

    /// Best estimate pose
    fused_pose: Pose,

    /// Added to the raw gyro reading to get the field heading
    gyro_offset_rad: f64,

    /// Raw gyro reading from the last propagation
    last_gyro_rad: f64,

    /// Field heading from the last propagation
    prev_heading_rad: f64,

    /// Module positions from the last propagation
    prev_modules: [ModulePosition; NUM_MODULES],

    history: PoseHistory,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PoseEstimator {
    /// Create a new estimator at the field origin, with a zero gyro reading and all modules at
    /// zero distance.
    pub fn new(params: Params) -> Result<Self, PoseEstError> {
        params.validate()?;

        let kinematics = SwerveKinematics::new(&params.module_locations_m_rb)?;

        let odom_variance_m2 = [
            params.odom_std_dev_m[0].powi(2),
            params.odom_std_dev_m[1].powi(2),
        ];

        let history = PoseHistory::new(params.history_capacity, params.history_window_s);

        Ok(Self {
            params,
            kinematics,
            odom_variance_m2,
            odom_pose: Pose::default(),
            fused_pose: Pose::default(),
            gyro_offset_rad: 0.0,
            last_gyro_rad: 0.0,
            prev_heading_rad: 0.0,
            prev_modules: [ModulePosition::default(); NUM_MODULES],
            history,
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Read access to the correction history.
    pub fn history(&self) -> &PoseHistory {
        &self.history
    }

    /// Get the current best estimate pose.
    pub fn get_estimate(&self) -> Pose {
        self.fused_pose
    }

    /// Get the pose from odometry alone.
    pub fn get_odometry_pose(&self) -> Pose {
        self.odom_pose
    }

    /// Advance the estimate with a new odometry sample.
    ///
    /// # Inputs
    /// - `timestamp_s`: time the sensors were sampled
    /// - `gyro_rad`: raw gyro heading. Rotation is taken from here, never from the wheels.
    /// - `modules`: current position of every swerve module
    ///
    /// On error the sample is discarded and the estimator is unchanged.
    pub fn propagate(
        &mut self,
        timestamp_s: f64,
        gyro_rad: f64,
        modules: &[ModulePosition; NUM_MODULES],
    ) -> Result<Pose, PoseEstError> {
        if !timestamp_s.is_finite() || !gyro_rad.is_finite() || !modules.iter().all(|m| m.is_finite()) {
            return Err(PoseEstError::InvalidOdometry);
        }

        let heading_rad = wrap_pi(gyro_rad + self.gyro_offset_rad);

        // Distance driven by each module since the last sample, at its current angle
        let mut deltas = [ModulePosition::default(); NUM_MODULES];
        for ((delta, curr), prev) in deltas.iter_mut().zip(modules.iter()).zip(self.prev_modules.iter()) {
            *delta = ModulePosition::new(curr.distance_m - prev.distance_m, curr.angle_rad);
        }

        let mut twist = self.kinematics.to_twist(&deltas);
        twist.dtheta_rad = ang_dist(self.prev_heading_rad, heading_rad);

        let mut new_odom = self.odom_pose.exp(&twist);
        new_odom.heading_rad = heading_rad;

        // Carry the same motion over to the fused pose
        let motion = self.odom_pose.motion_to(&new_odom);
        let mut new_fused = self.fused_pose.transform_by(&motion);
        new_fused.heading_rad = heading_rad;

        self.odom_pose = new_odom;
        self.fused_pose = new_fused;
        self.prev_modules = *modules;
        self.prev_heading_rad = heading_rad;
        self.last_gyro_rad = gyro_rad;

        self.history.push(Sample {
            timestamp_s,
            odom_pose: new_odom,
            fused_pose: new_fused,
        });

        trace!(
            "Propagated to ({:.3}, {:.3}, {:.3}) at {:.3} s",
            new_fused.position_m.x,
            new_fused.position_m.y,
            new_fused.heading_rad,
            timestamp_s
        );

        Ok(new_fused)
    }

    /// Blend a vision observation into the trajectory at the time it was captured.
    ///
    /// # Inputs
    /// - `observed_pose`: the observed pose, only the position is used
    /// - `timestamp_s`: time the observation was captured, may be in the past but never later
    ///   than the newest odometry sample plus `max_future_correction_s`
    /// - `variance_m2`: measurement variance in field X and Y, finite and positive
    ///
    /// On error the correction is discarded and the estimator is unchanged.
    pub fn correct(
        &mut self,
        observed_pose: &Pose,
        timestamp_s: f64,
        variance_m2: [f64; 2],
    ) -> Result<Pose, PoseEstError> {
        if variance_m2.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(PoseEstError::InvalidVariance(variance_m2));
        }

        if !observed_pose.position_m.iter().all(|v| v.is_finite()) {
            return Err(PoseEstError::InvalidObservation(*observed_pose));
        }

        if !timestamp_s.is_finite() {
            return Err(PoseEstError::InvalidTimestamp);
        }

        let (oldest_s, newest_s) = match (self.history.oldest(), self.history.newest()) {
            (Some(o), Some(n)) => (o.timestamp_s, n.timestamp_s),
            _ => return Err(PoseEstError::NoHistory),
        };

        if timestamp_s < oldest_s || newest_s - timestamp_s > self.params.history_window_s {
            return Err(PoseEstError::StaleCorrection {
                timestamp_s,
                oldest_s,
            });
        }

        if timestamp_s > newest_s + self.params.max_future_correction_s {
            return Err(PoseEstError::FutureCorrection {
                timestamp_s,
                newest_s,
            });
        }

        // Small clock skew, nothing is known after the newest sample so apply it there
        let timestamp_s = timestamp_s.min(newest_s);

        let (odom_then, fused_then) = self
            .history
            .sample_at(timestamp_s)
            .ok_or(PoseEstError::NoHistory)?;

        let error_m = observed_pose.position_m - fused_then.position_m;

        let mut corrected = fused_then;
        for axis in 0..2 {
            corrected.position_m[axis] +=
                gain(self.odom_variance_m2[axis], variance_m2[axis]) * error_m[axis];
        }

        self.fused_pose = self
            .history
            .insert_and_replay(Sample {
                timestamp_s,
                odom_pose: odom_then,
                fused_pose: corrected,
            })
            .ok_or(PoseEstError::NoHistory)?;

        trace!(
            "Corrected at {:.3} s by ({:.3}, {:.3})",
            timestamp_s,
            corrected.position_m.x - fused_then.position_m.x,
            corrected.position_m.y - fused_then.position_m.y
        );

        Ok(self.fused_pose)
    }

    /// Reseed the estimator at `pose`, discarding all history.
    ///
    /// The gyro offset is recomputed from the last gyro reading so the next propagation continues
    /// from `pose`.
    pub fn reset(&mut self, pose: &Pose) {
        self.gyro_offset_rad = pose.heading_rad - self.last_gyro_rad;
        self.prev_heading_rad = pose.heading_rad;
        self.odom_pose = *pose;
        self.fused_pose = *pose;
        self.history.clear();
    }
}

/// Steady state Kalman gain for odometry variance `q` and measurement variance `r`.
fn gain(q: f64, r: f64) -> f64 {
    if q == 0.0 {
        0.0
    }
    else {
        q / (q + (q * r).sqrt())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
