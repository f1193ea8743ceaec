use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::errors::CoreError;

use super::traits::KeyValueStore;

/// In-memory backend. Useful for WASM hosts that sync elsewhere, and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a value is currently stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().map(|v| v.contains_key(key)).unwrap_or(false)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, CoreError> {
        self.values
            .lock()
            .map_err(|_| CoreError::Storage("Memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
