//! # Pose estimation module
//!
//! The pose estimator fuses swerve odometry with vision corrections into a single field-frame
//! pose.
//!
//! Odometry is propagated every cycle. The translation comes from the module encoders through the
//! swerve forward kinematics. The rotation comes from the gyro alone, so the wheels never decide
//! the heading.
//!
//! Vision corrections arrive late. A camera frame captured at `t` may only be reported several
//! cycles after `t`. The estimator therefore keeps a short history of `(odometry pose, fused pose)`
//! samples. When a correction arrives it is blended into the fused pose as it was at `t`, then
//! every sample after `t` is replayed by re-applying the odometry motion recorded since `t`. The
//! correction only ever moves x and y: heading variance is treated as infinite.
//!
//! The blend gain per axis is the steady state Kalman gain `q / (q + sqrt(q * r))`, where `q` is
//! the odometry variance and `r` the measurement variance.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod history;
mod kinematics;
mod params;
mod pose;
mod state;
mod vision;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use history::{PoseHistory, Sample};
pub use kinematics::SwerveKinematics;
pub use params::Params;
pub use pose::{Pose, Twist};
pub use state::PoseEstimator;
pub use vision::{Solution, VisionCorrection};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during pose estimation.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PoseEstError {
    #[error("Module locations are degenerate, cannot solve the swerve kinematics")]
    SingularModuleGeometry,

    #[error("Invalid pose estimator parameters: {0}")]
    InvalidParams(String),

    #[error("Measurement variance must be finite and positive, found {0:?}")]
    InvalidVariance([f64; 2]),

    #[error("Observed pose is not finite: {0:?}")]
    InvalidObservation(Pose),

    #[error("Capture timestamp is not finite")]
    InvalidTimestamp,

    #[error("Odometry sample contains non-finite values")]
    InvalidOdometry,

    #[error("No odometry history to apply the correction to")]
    NoHistory,

    #[error("Correction captured at {timestamp_s} s is older than the oldest history sample ({oldest_s} s)")]
    StaleCorrection {
        timestamp_s: f64,
        oldest_s: f64
    },

    #[error("Correction captured at {timestamp_s} s is ahead of the newest history sample ({newest_s} s)")]
    FutureCorrection {
        timestamp_s: f64,
        newest_s: f64
    },
}
