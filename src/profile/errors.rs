// seisgrid/src/profile/errors.rs

use crate::grid::AxisName;
use ndarray::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Query {axis} {value} lies outside the grid range [{min}, {max}]")]
    OutOfDomain {
        axis: AxisName,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error(transparent)]
    NDArrayShapeError(#[from] ShapeError),
}

#[derive(Error, Debug)]
pub enum LineError {
    #[error("Start and end points coincide at ({0}, {1})")]
    DegenerateLine(f64, f64),
    #[error("Start ({0}, {1}) and end ({2}, {3}) are antipodal, the great circle is undefined")]
    AntipodalLine(f64, f64, f64, f64),
    #[error("Sampling step must be > 0 degrees, but got {0}")]
    InvalidStep(f64),
    #[error(transparent)]
    LineSpecBuilderError(#[from] super::line::LineSpecBuilderError),
}
