//! Field-frame pose and its SE(2) helpers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Isometry2, Vector2};
use serde::{Deserialize, Serialize};
use util::maths::{ang_dist, wrap_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this rotation the exponential map uses its Taylor expansion.
const SMALL_ANGLE_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and heading) of the robot in the field frame.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// The position in the field frame
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The angle from the field X axis to the robot X axis, counter-clockwise positive, in the
    /// range (-pi, pi].
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// A motion along a constant-curvature arc, expressed in the robot frame at the start of the
/// motion.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Twist {
    pub dx_m: f64,
    pub dy_m: f64,
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad: wrap_pi(heading_rad),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|v| v.is_finite()) && self.heading_rad.is_finite()
    }

    pub fn to_isometry(&self) -> Isometry2<f64> {
        Isometry2::new(self.position_m, self.heading_rad)
    }

    pub fn from_isometry(iso: &Isometry2<f64>) -> Self {
        Self {
            position_m: iso.translation.vector,
            heading_rad: iso.rotation.angle(),
        }
    }

    /// The rigid motion which takes `self` onto `other`, expressed in the frame of `self`.
    pub fn motion_to(&self, other: &Pose) -> Isometry2<f64> {
        self.to_isometry().inverse() * other.to_isometry()
    }

    /// Apply a motion expressed in the frame of `self`.
    pub fn transform_by(&self, motion: &Isometry2<f64>) -> Pose {
        Pose::from_isometry(&(self.to_isometry() * motion))
    }

    /// Integrate a twist starting from this pose (the SE(2) exponential map).
    pub fn exp(&self, twist: &Twist) -> Pose {
        let dtheta = twist.dtheta_rad;
        let (sin_theta, cos_theta) = dtheta.sin_cos();

        let (s, c) = if dtheta.abs() < SMALL_ANGLE_RAD {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        }
        else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        let motion = Isometry2::new(
            Vector2::new(
                twist.dx_m * s - twist.dy_m * c,
                twist.dx_m * c + twist.dy_m * s
            ),
            dtheta
        );

        self.transform_by(&motion)
    }

    /// Linearly interpolate towards `other`, with `t` in [0, 1]. The heading takes the shortest
    /// way round.
    pub fn interpolate(&self, other: &Pose, t: f64) -> Pose {
        Pose {
            position_m: self.position_m + (other.position_m - self.position_m) * t,
            heading_rad: wrap_pi(self.heading_rad + ang_dist(self.heading_rad, other.heading_rad) * t),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_exp_straight() {
        let p = Pose::new(1.0, 2.0, FRAC_PI_2);
        let q = p.exp(&Twist { dx_m: 1.0, dy_m: 0.0, dtheta_rad: 0.0 });

        assert_abs_diff_eq!(q.position_m, Vector2::new(1.0, 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(q.heading_rad, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_exp_arc() {
        // Quarter circle of radius 1 turning left
        let p = Pose::default();
        let q = p.exp(&Twist { dx_m: FRAC_PI_2, dy_m: 0.0, dtheta_rad: FRAC_PI_2 });

        assert_abs_diff_eq!(q.position_m, Vector2::new(1.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(q.heading_rad, FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_motion_round_trip() {
        let a = Pose::new(1.0, -1.0, 0.3);
        let b = Pose::new(-2.0, 4.0, -2.9);

        let m = a.motion_to(&b);
        let c = a.transform_by(&m);

        assert_abs_diff_eq!(c.position_m, b.position_m, epsilon = 1e-12);
        assert_abs_diff_eq!(c.heading_rad, b.heading_rad, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_wraps() {
        let a = Pose::new(0.0, 0.0, PI - 0.1);
        let b = Pose::new(2.0, 4.0, -PI + 0.1);
        let m = a.interpolate(&b, 0.5);

        assert_abs_diff_eq!(m.position_m, Vector2::new(1.0, 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(m.heading_rad.abs(), PI, epsilon = 1e-12);
    }
}
