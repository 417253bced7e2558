// seisgrid/src/cache/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid cache entry {0}: {1}")]
    InvalidEntry(String, String),
    #[error("Invalid cache name {0:?}: names must be a single non-empty path component")]
    InvalidName(String),
    #[error("In-memory cache lock was poisoned")]
    Poisoned,
}
