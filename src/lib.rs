use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use cache::{ArrayStore, CacheError, MemoryStore, NpyDirStore};
pub use coords::{geocentric_xyz, latlondep_to_xyz, CoordError, EARTH_RADIUS_KM};
pub use grid::{Axis, AxisName, GridAxes3, GridError, RegularGrid2, RegularGrid3};
pub use profile::{model_interp, topo_interp, ResampleError};
pub use psf::{PsfError, PsfSynthesizer, PsfSynthesizerBuilder};
pub mod cache;
pub mod coords;
pub mod grid;
pub mod profile;
pub mod psf;
