// seisgrid/src/grid/mod.rs

mod axis;
mod errors;
mod regular;

pub use axis::{Axis, AxisName};
pub use errors::GridError;
pub use regular::{GridAxes3, RegularGrid2, RegularGrid3};
