// seisgrid/src/grid/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Data shape {data:?} does not match axis lengths {axes:?}")]
    ShapeMismatch { data: Vec<usize>, axes: Vec<usize> },
    #[error("Axis must be finite and strictly increasing, but value {1} at index {0} follows {2}")]
    NonMonotonicAxis(usize, f64, f64),
    #[error("Axis values must be finite, but got {1} at index {0}")]
    NonFiniteAxisValue(usize, f64),
    #[error("Axis must hold at least 2 values, but got {0}")]
    AxisTooShort(usize),
}
