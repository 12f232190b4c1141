//! Swerve drive forward kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{SMatrix, SVector};
use state_if::{ModulePosition, NUM_MODULES};

use super::{PoseEstError, Twist};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of rows in the kinematics matrix, an X and a Y row per module.
const NUM_ROWS: usize = 2 * NUM_MODULES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts module displacements into a robot twist.
///
/// Each module `i` at `(x_i, y_i)` moves by `(dx - dtheta * y_i, dy + dtheta * x_i)` for a robot
/// twist `(dx, dy, dtheta)`. With four modules the system is overdetermined, so the twist is the
/// least squares solution, found with the pseudo-inverse computed once at construction.
#[derive(Debug, Clone)]
pub struct SwerveKinematics {
    forward: SMatrix<f64, 3, NUM_ROWS>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKinematics {
    pub fn new(module_locations_m_rb: &[[f64; 2]; NUM_MODULES]) -> Result<Self, PoseEstError> {
        let mut inverse = SMatrix::<f64, NUM_ROWS, 3>::zeros();

        for (i, [x, y]) in module_locations_m_rb.iter().enumerate() {
            inverse[(2 * i, 0)] = 1.0;
            inverse[(2 * i, 2)] = -y;
            inverse[(2 * i + 1, 1)] = 1.0;
            inverse[(2 * i + 1, 2)] = *x;
        }

        let normal = inverse.transpose() * inverse;
        let normal_inv = normal
            .try_inverse()
            .ok_or(PoseEstError::SingularModuleGeometry)?;

        Ok(Self {
            forward: normal_inv * inverse.transpose(),
        })
    }

    /// Get the robot twist from the change in each module's position.
    ///
    /// `deltas` holds the distance driven by each module since the last sample, along with the
    /// module's current angle.
    pub fn to_twist(&self, deltas: &[ModulePosition; NUM_MODULES]) -> Twist {
        let mut displacements = SVector::<f64, NUM_ROWS>::zeros();

        for (i, d) in deltas.iter().enumerate() {
            let (sin, cos) = d.angle_rad.sin_cos();
            displacements[2 * i] = d.distance_m * cos;
            displacements[2 * i + 1] = d.distance_m * sin;
        }

        let twist = self.forward * displacements;

        Twist {
            dx_m: twist[0],
            dy_m: twist[1],
            dtheta_rad: twist[2],
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
    use std::f64::consts::FRAC_PI_4;

    const LOCATIONS: [[f64; 2]; NUM_MODULES] = [[0.3, 0.3], [0.3, -0.3], [-0.3, 0.3], [-0.3, -0.3]];

    #[test]
    fn test_translation() {
        let k = SwerveKinematics::new(&LOCATIONS).unwrap();

        let twist = k.to_twist(&[ModulePosition::new(0.5, 0.0); NUM_MODULES]);
        assert_abs_diff_eq!(twist.dx_m, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(twist.dy_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(twist.dtheta_rad, 0.0, epsilon = 1e-12);

        let twist = k.to_twist(&[ModulePosition::new(1.0, FRAC_PI_4); NUM_MODULES]);
        assert_abs_diff_eq!(twist.dx_m, FRAC_PI_4.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(twist.dy_m, FRAC_PI_4.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation() {
        let k = SwerveKinematics::new(&LOCATIONS).unwrap();

        // Modules tangent to the circle through them, turning counter-clockwise
        let r = (0.3f64 * 0.3 * 2.0).sqrt();
        let deltas: Vec<ModulePosition> = LOCATIONS
            .iter()
            .map(|[x, y]| ModulePosition::new(0.1 * r, y.atan2(*x) + std::f64::consts::FRAC_PI_2))
            .collect();

        let twist = k.to_twist(&[deltas[0], deltas[1], deltas[2], deltas[3]]);
        assert_abs_diff_eq!(twist.dx_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(twist.dy_m, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(twist.dtheta_rad, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_geometry() {
        assert_eq!(
            SwerveKinematics::new(&[[0.0, 0.0]; NUM_MODULES]).unwrap_err(),
            PoseEstError::SingularModuleGeometry
        );
    }
}
