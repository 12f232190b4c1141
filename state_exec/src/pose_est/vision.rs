//! Conversion of camera reports into weighted corrections

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use state_if::{cam::CamPose, CameraReport};

use super::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single vision measurement ready to be applied to the estimator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VisionCorrection {
    /// Which of the camera's solutions this came from
    pub solution: Solution,

    /// The observed robot pose. Only the position is used.
    pub observed_pose: Pose,

    /// Time at which the frame was captured.
    ///
    /// Units: seconds
    pub timestamp_s: f64,

    /// Measurement variance in the field X and Y axes.
    ///
    /// Units: meters^2
    pub variance_m2: [f64; 2],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Solution {
    Primary,
    Secondary,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VisionCorrection {
    /// Build the corrections contained in a camera report, secondary solution first.
    ///
    /// The standard deviation of each solution grows with the square of the average target
    /// distance and shrinks with the number of targets seen:
    ///
    /// ```text
    /// std_dev = coeff * avg_distance^2 / total_targets * horizontal_fov
    /// ```
    ///
    /// Returns `None` if the camera has no targets.
    pub fn from_report(report: &CameraReport) -> Option<[VisionCorrection; 2]> {
        if !report.target_acquired || report.total_targets == 0 {
            return None;
        }

        let geometry = report.average_distance_m.powi(2)
            / report.total_targets as f64
            * report.horizontal_fov_rad;

        let build = |solution, pose: &CamPose, coeff: f64| {
            let std_dev = coeff * geometry;
            let variance = std_dev * std_dev;

            VisionCorrection {
                solution,
                observed_pose: Pose::new(pose.x_m, pose.y_m, pose.heading_rad),
                timestamp_s: report.frame_timestamp_s,
                variance_m2: [variance, variance],
            }
        };

        Some([
            build(
                Solution::Secondary,
                &report.secondary_pose,
                report.secondary_xy_std_dev_coeff,
            ),
            build(
                Solution::Primary,
                &report.primary_pose,
                report.primary_xy_std_dev_coeff,
            ),
        ])
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn report() -> CameraReport {
        CameraReport {
            name: String::from("front"),
            target_acquired: true,
            primary_pose: CamPose { x_m: 1.0, y_m: 2.0, heading_rad: 0.1 },
            secondary_pose: CamPose { x_m: 1.1, y_m: 2.1, heading_rad: 0.2 },
            frame_timestamp_s: 3.0,
            primary_xy_std_dev_coeff: 0.1,
            secondary_xy_std_dev_coeff: 0.5,
            average_distance_m: 2.0,
            total_targets: 2,
            horizontal_fov_rad: 1.0,
        }
    }

    #[test]
    fn test_from_report() {
        let [secondary, primary] = VisionCorrection::from_report(&report()).unwrap();

        assert_eq!(secondary.solution, Solution::Secondary);
        assert_eq!(primary.solution, Solution::Primary);
        assert_eq!(primary.timestamp_s, 3.0);
        assert_eq!(primary.observed_pose.position_m.x, 1.0);

        // std_dev = 0.1 * 4 / 2 * 1 = 0.2
        assert_abs_diff_eq!(primary.variance_m2[0], 0.04, epsilon = 1e-12);
        assert_abs_diff_eq!(primary.variance_m2[1], 0.04, epsilon = 1e-12);
        // std_dev = 0.5 * 4 / 2 * 1 = 1.0
        assert_abs_diff_eq!(secondary.variance_m2[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_targets() {
        let mut r = report();
        r.target_acquired = false;
        assert!(VisionCorrection::from_report(&r).is_none());

        let mut r = report();
        r.total_targets = 0;
        assert!(VisionCorrection::from_report(&r).is_none());
    }
}
