use loyalty_state::{KeyValueState, StateError, WriteBatch};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};

/// One invocation's window onto ledger state.
///
/// Reads see the invocation's own staged writes first, then the value first
/// observed in the backing state; the backing state is consulted at most
/// once per key. Writes are only staged. Nothing reaches the backing state
/// until the caller hands [`into_batch`](Self::into_batch) to
/// `KeyValueState::apply`, so dropping a view discards the invocation.
pub struct StateView<'a, S: KeyValueState + ?Sized> {
    state: &'a S,
    batch: WriteBatch,
}

impl<'a, S: KeyValueState + ?Sized> StateView<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            batch: WriteBatch::new(),
        }
    }

    /// Read raw bytes under `key`.
    pub fn get(&mut self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        if let Some(staged) = self.batch.staged(key) {
            return Ok(Some(staged.to_vec()));
        }
        if let Some(observed) = self.batch.observed(key) {
            return Ok(observed.map(<[u8]>::to_vec));
        }
        let value = self
            .state
            .get(key)
            .map_err(|e| LedgerError::read_failure(key, e))?;
        debug!(key, present = value.is_some(), "state read");
        self.batch.record_read(key, value.clone());
        Ok(value)
    }

    /// Returns `true` if any value exists under `key`.
    pub fn exists(&mut self, key: &str) -> LedgerResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Stage raw bytes under `key`.
    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        debug!(key, bytes = value.len(), "staged write");
        self.batch.stage(key, value);
    }

    /// Read and decode a JSON value.
    pub fn get_json<T: DeserializeOwned>(&mut self, key: &str) -> LedgerResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| LedgerError::read_failure(key, format!("decode: {e}"))),
            None => Ok(None),
        }
    }

    /// Read a JSON array, treating an absent key as empty.
    pub fn get_list<T: DeserializeOwned>(&mut self, key: &str) -> LedgerResult<Vec<T>> {
        Ok(self.get_json(key)?.unwrap_or_default())
    }

    /// Encode and stage a JSON value.
    pub fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> LedgerResult<()> {
        let encoded = serde_json::to_vec(value).map_err(|e| {
            LedgerError::StateWriteFailure(StateError::Serialization(format!("encode {key}: {e}")))
        })?;
        self.put(key, encoded);
        Ok(())
    }

    /// The staged writes and recorded reads so far.
    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    pub fn into_batch(self) -> WriteBatch {
        self.batch
    }
}
