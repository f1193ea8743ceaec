use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::journal::TradeStore;
use crate::models::record::TradeRecord;

use super::traits::KeyValueStore;

/// High-level persistence: hydrate a journal from its blob, write it back
/// after every mutation.
///
/// Blob format: a JSON array of records.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a store to its persisted JSON form.
    pub fn to_bytes(store: &TradeStore) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(store)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize journal: {e}")))
    }

    /// Parse a persisted blob. Anything other than an array of records fails.
    pub fn from_bytes(bytes: &[u8]) -> Result<TradeStore, CoreError> {
        let records: Vec<TradeRecord> = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::Deserialization(format!("Failed to parse journal: {e}")))?;
        Ok(TradeStore::from_records(records))
    }

    /// Load the store under `key`. Never fails: an absent key, an unreadable
    /// backend or a corrupt value all yield an empty store. A corrupt value is
    /// deleted so it does not fail again on the next start.
    pub fn hydrate(backend: &dyn KeyValueStore, key: &str) -> TradeStore {
        let bytes = match backend.load(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "No persisted journal, starting empty");
                return TradeStore::new();
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read persisted journal, starting empty");
                return TradeStore::new();
            }
        };

        match Self::from_bytes(&bytes) {
            Ok(store) => {
                debug!(key, records = store.len(), "Hydrated journal");
                store
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding malformed persisted journal");
                if let Err(e) = backend.remove(key) {
                    warn!(key, error = %e, "Failed to delete malformed persisted journal");
                }
                TradeStore::new()
            }
        }
    }

    /// Write the whole store under `key`, or delete the key when the store is
    /// empty.
    pub fn try_persist(
        backend: &dyn KeyValueStore,
        key: &str,
        store: &TradeStore,
    ) -> Result<(), CoreError> {
        if store.is_empty() {
            backend.remove(key)
        } else {
            let bytes = Self::to_bytes(store)?;
            backend.save(key, &bytes)
        }
    }

    /// Best-effort variant of [`Self::try_persist`]: failures (e.g., quota
    /// exceeded) are logged and swallowed. Returns whether the write landed.
    pub fn persist(backend: &dyn KeyValueStore, key: &str, store: &TradeStore) -> bool {
        match Self::try_persist(backend, key, store) {
            Ok(()) => {
                debug!(key, records = store.len(), "Persisted journal");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to persist journal; in-memory state kept");
                false
            }
        }
    }
}
