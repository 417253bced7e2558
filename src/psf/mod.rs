// seisgrid/src/psf/mod.rs

mod errors;
pub mod kernel;
pub mod sources;
mod synthesizer;

pub use errors::PsfError;
pub use kernel::{Accumulate, GaussianKernel, KernelError, KERNEL_CUTOFF};
pub use sources::{
    parse_source_list, read_source_list, to_point_sources, PointSource, SourceListError,
    SourceRecord,
};
pub use synthesizer::{
    CacheStatus, DEFAULT_CACHE_NAME, PsfSynthesizer, PsfSynthesizerBuilder, Synthesis,
};
