// seisgrid/src/cache/mod.rs

mod errors;
mod memory;
mod npy;

pub use errors::CacheError;
pub use memory::MemoryStore;
pub use npy::NpyDirStore;

use ndarray::{ArrayD, ArrayViewD};

/// Named array memo storage.
///
/// An entry must always hold the deterministic output of whatever produced it. No
/// invalidation happens here; callers pick a new name when inputs change.
pub trait ArrayStore {
    /// `Ok(None)` means no entry exists under `name`.
    fn load(&self, name: &str) -> Result<Option<ArrayD<f64>>, CacheError>;

    /// Stores `array` under `name`, replacing any previous entry.
    fn save(&self, name: &str, array: ArrayViewD<f64>) -> Result<(), CacheError>;

    /// Fails with [`CacheError::InvalidName`] if `name` can never be stored.
    fn validate_name(&self, _name: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
