//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    let wrapped = pi_t - rem_euclid(pi_t - angle, tau_t);

    // rem_euclid can round up to tau, which would land us on -pi
    if wrapped <= -pi_t {
        wrapped + tau_t
    }
    else {
        wrapped
    }
}

/// Get the signed shortest angular distance from `a` to `b`, in (-pi, pi].
pub fn ang_dist<T>(a: T, b: T) -> T
where
    T: Float
{
    wrap_pi(b - a)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (10f64, 20f64), 0.5), 15.0);
        assert_eq!(lin_map((1f64, 3f64), (-1f64, 1f64), 1.0), -1.0);
        assert_eq!(lin_map((1f64, 3f64), (-1f64, 1f64), 4.0), 2.0);
    }

    #[test]
    fn test_wrap_pi() {
        assert_abs_diff_eq!(wrap_pi(0f64), 0.0);
        assert_abs_diff_eq!(wrap_pi(PI), PI);
        assert_abs_diff_eq!(wrap_pi(-PI), PI);
        assert_abs_diff_eq!(wrap_pi(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_pi(-FRAC_PI_2 - TAU), -FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_pi(3.0 * FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_ang_dist() {
        assert_abs_diff_eq!(ang_dist(1f64, 2f64), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ang_dist(2f64, 1f64), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ang_dist(0f64, TAU), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ang_dist(PI - 0.1, -PI + 0.1), 0.2, epsilon = 1e-12);
    }
}
