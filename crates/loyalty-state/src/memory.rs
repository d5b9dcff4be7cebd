use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::batch::WriteBatch;
use crate::error::{StateError, StateResult};
use crate::traits::KeyValueState;

/// In-memory, HashMap-based ledger state.
///
/// Intended for tests and embedding. Values are held behind a `RwLock`;
/// batches are validated and applied under a single write lock.
pub struct InMemoryState {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return a sorted list of all keys.
    pub fn keys(&self) -> StateResult<Vec<String>> {
        let map = self.entries.read().map_err(|_| StateError::LockPoisoned)?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Copy of every entry, sorted by key.
    pub fn snapshot(&self) -> StateResult<Vec<(String, Vec<u8>)>> {
        let map = self.entries.read().map_err(|_| StateError::LockPoisoned)?;
        let mut entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }
}

impl Default for InMemoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueState for InMemoryState {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StateError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::InvalidKey(key.to_string()));
        }
        let mut map = self.entries.write().map_err(|_| StateError::LockPoisoned)?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn apply(&self, batch: &WriteBatch) -> StateResult<()> {
        if let Some((key, _)) = batch.writes().find(|(key, _)| key.is_empty()) {
            return Err(StateError::InvalidKey(key.clone()));
        }

        let mut map = self.entries.write().map_err(|_| StateError::LockPoisoned)?;
        if let Some(key) = batch.first_conflict(|k| map.get(k).map(Vec::as_slice)) {
            warn!(key = %key, "rejecting batch with stale read");
            return Err(StateError::Conflict { key });
        }
        for (key, value) in batch.writes() {
            map.insert(key.clone(), value.clone());
        }
        debug!(writes = batch.len(), "applied batch");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryState")
            .field("key_count", &self.len())
            .finish()
    }
}
