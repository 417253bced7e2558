// seisgrid/src/profile/mod.rs

mod errors;
mod interp;
pub mod line;

pub use errors::{LineError, ResampleError};
pub use interp::{depth_slice, mask_above, model_interp, topo_interp};
pub use line::{extend_line, great_circle_points, LineSpec, LineSpecBuilder};
