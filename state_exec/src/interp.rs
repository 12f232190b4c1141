//! # Interpolated lookup table
//!
//! A piecewise-linear function of one variable, built from calibration points. Queries between two
//! keys interpolate linearly, queries outside the calibrated range clamp to the nearest end point.
//! There is no extrapolation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use ordered_float::OrderedFloat;
use serde::Deserialize;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Interpolating table mapping an input (usually a distance) onto an output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>")]
pub struct InterpTable {
    points: BTreeMap<OrderedFloat<f64>, f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum InterpError {
    #[error("Table points must be finite, found ({0}, {1})")]
    NonFinitePoint(f64, f64),

    #[error("Table contains the key {0} more than once")]
    DuplicateKey(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InterpTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list of `[input, output]` pairs, which need not be sorted.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, InterpError> {
        let mut table = Self::new();

        for &[x, y] in pairs {
            if table.points.contains_key(&OrderedFloat(x)) {
                return Err(InterpError::DuplicateKey(x));
            }
            table.put(x, y)?;
        }

        Ok(table)
    }

    /// Insert a point, overwriting any existing output at the same input.
    pub fn put(&mut self, x: f64, y: f64) -> Result<(), InterpError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(InterpError::NonFinitePoint(x, y));
        }

        self.points.insert(OrderedFloat(x), y);

        Ok(())
    }

    /// Get the interpolated output at `x`.
    ///
    /// Returns `None` if the table is empty or `x` is NaN.
    pub fn get(&self, x: f64) -> Option<f64> {
        if x.is_nan() {
            return None;
        }

        let key = OrderedFloat(x);

        // Highest point at or below x, and lowest point strictly above it
        let below = self.points.range(..=key).next_back();
        let above = self.points.range((Excluded(key), Unbounded)).next();

        match (below, above) {
            (Some((x0, y0)), Some((x1, y1))) => {
                if x0.0 == x {
                    Some(*y0)
                }
                else {
                    Some(lin_map((x0.0, x1.0), (*y0, *y1), x))
                }
            },
            (Some((_, y0)), None) => Some(*y0),
            (None, Some((_, y1))) => Some(*y1),
            (None, None) => None
        }
    }

    /// Number of points in the table.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the `(input, output)` points in increasing input order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|(x, y)| (x.0, *y))
    }

    /// Lowest input in the table.
    pub fn min_input(&self) -> Option<f64> {
        self.points.keys().next().map(|k| k.0)
    }
}

impl std::convert::TryFrom<Vec<[f64; 2]>> for InterpTable {
    type Error = InterpError;

    fn try_from(pairs: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::from_pairs(&pairs)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn table() -> InterpTable {
        InterpTable::from_pairs(&[[3.0, 30.0], [1.0, 10.0], [2.0, 14.0]]).unwrap()
    }

    #[test]
    fn test_interpolation() {
        let t = table();

        // Midpoints
        assert_eq!(t.get(1.5), Some(12.0));
        assert_eq!(t.get(2.5), Some(22.0));
        assert_eq!(t.get(1.25), Some(11.0));

        // Exact hits
        assert_eq!(t.get(1.0), Some(10.0));
        assert_eq!(t.get(2.0), Some(14.0));
        assert_eq!(t.get(3.0), Some(30.0));

        // Clamping at both ends
        assert_eq!(t.get(0.0), Some(10.0));
        assert_eq!(t.get(-100.0), Some(10.0));
        assert_eq!(t.get(3.5), Some(30.0));
        assert_eq!(t.get(f64::INFINITY), Some(30.0));
        assert_eq!(t.get(f64::NEG_INFINITY), Some(10.0));

        assert_eq!(t.get(f64::NAN), None);
        assert_eq!(t.min_input(), Some(1.0));
    }

    #[test]
    fn test_put_overwrites() {
        let mut t = table();
        t.put(2.0, 20.0).unwrap();

        assert_eq!(t.len(), 3);
        assert_eq!(t.get(2.0), Some(20.0));
        assert_eq!(t.get(1.5), Some(15.0));

        assert!(matches!(t.put(f64::NAN, 1.0), Err(InterpError::NonFinitePoint(_, _))));
        assert!(matches!(t.put(1.0, f64::INFINITY), Err(InterpError::NonFinitePoint(_, _))));
    }

    #[test]
    fn test_single_point_and_empty() {
        let mut t = InterpTable::new();
        assert!(t.is_empty());
        assert_eq!(t.get(1.0), None);

        t.put(0.0, 0.25).unwrap();
        assert_eq!(t.get(-1.0), Some(0.25));
        assert_eq!(t.get(0.0), Some(0.25));
        assert_eq!(t.get(10.0), Some(0.25));
    }

    #[test]
    fn test_invalid_pairs() {
        assert_eq!(
            InterpTable::from_pairs(&[[1.0, 2.0], [1.0, 3.0]]),
            Err(InterpError::DuplicateKey(1.0))
        );
        assert!(matches!(
            InterpTable::from_pairs(&[[f64::INFINITY, 2.0]]),
            Err(InterpError::NonFinitePoint(_, _))
        ));
    }
}
