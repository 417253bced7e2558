// seisgrid/src/grid/axis.rs

use super::errors::GridError;
use ndarray::{Array, Array1};
use std::fmt;

/// Which coordinate of a grid an [`Axis`] spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisName {
    Longitude,
    Latitude,
    Depth,
}

impl fmt::Display for AxisName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisName::Longitude => "longitude",
            AxisName::Latitude => "latitude",
            AxisName::Depth => "depth",
        };
        write!(f, "{}", name)
    }
}

/// A strictly increasing, finite coordinate axis with at least two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    values: Array1<f64>,
}

impl Axis {
    pub fn new(values: Array1<f64>) -> Result<Self, GridError> {
        Self::validate(&values)?;
        Ok(Self { values })
    }

    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self, GridError> {
        Self::new(Array::linspace(start, end, n))
    }

    fn validate(values: &Array1<f64>) -> Result<(), GridError> {
        if values.len() < 2 {
            return Err(GridError::AxisTooShort(values.len()));
        }
        for (i, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(GridError::NonFiniteAxisValue(i, value));
            }
            if i > 0 && value <= values[i - 1] {
                return Err(GridError::NonMonotonicAxis(i, value, values[i - 1]));
            }
        }
        Ok(())
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min() && x <= self.max()
    }

    /// Finds the cell holding `x`.
    ///
    /// Returns the lower node index `i` and the fraction `t` in `[0, 1]` such that
    /// `x = axis[i] + t * (axis[i + 1] - axis[i])`. The last node belongs to the final
    /// cell with `t = 1`. Values outside the axis range (or NaN) give `None`.
    pub fn locate(&self, x: f64) -> Option<(usize, f64)> {
        if !self.contains(x) {
            return None;
        }
        let mut lo = 0;
        let mut hi = self.values.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.values[mid] <= x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let left = self.values[lo];
        let right = self.values[hi];
        Some((lo, (x - left) / (right - left)))
    }
}

impl TryFrom<Vec<f64>> for Axis {
    type Error = GridError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(Array1::from_vec(values))
    }
}
