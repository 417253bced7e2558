// seisgrid/src/psf/errors.rs

use super::kernel::KernelError;
use super::sources::SourceListError;
use crate::cache::CacheError;
use crate::coords::CoordError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PsfError {
    #[error("Unitialized field on PsfSynthesizerBuilder: {0}")]
    UninitializedFieldError(String),
    #[error("Cache name must not be empty")]
    EmptyCacheName,
    #[error("Could not broadcast axis of length {0} to grid shape {1:?}")]
    BroadcastError(usize, (usize, usize, usize)),
    #[error(transparent)]
    CacheError(#[from] CacheError),
    #[error(transparent)]
    CoordError(#[from] CoordError),
    #[error(transparent)]
    KernelError(#[from] KernelError),
    #[error(transparent)]
    SourceListError(#[from] SourceListError),
}
