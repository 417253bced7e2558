// seisgrid/src/cache/memory.rs

use super::errors::CacheError;
use super::ArrayStore;
use ndarray::{ArrayD, ArrayViewD};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store, for tests and one-off runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, ArrayD<f64>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(name))
            .unwrap_or(false)
    }
}

impl ArrayStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<ArrayD<f64>>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(name).cloned())
    }

    fn save(&self, name: &str, array: ArrayViewD<f64>) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(name.to_string(), array.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_memory_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("a").unwrap().is_none());
        let array = Array2::from_shape_fn((3, 2), |(i, j)| (i + 10 * j) as f64).into_dyn();
        store.save("a", array.view()).unwrap();
        assert!(store.contains("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("a").unwrap().unwrap(), array);
    }
}
