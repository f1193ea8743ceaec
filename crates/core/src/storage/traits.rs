use std::sync::Arc;

use crate::errors::CoreError;

/// Key-value persistence backend (browser local storage, a directory on disk,
/// or memory in tests).
///
/// Each value is an opaque byte blob. Backends are called synchronously;
/// callers decide whether a failure matters.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if the key is absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;

    /// Write `bytes` under `key`, replacing any previous value.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        (**self).save(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        (**self).remove(key)
    }
}
