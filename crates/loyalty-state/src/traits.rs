use crate::batch::WriteBatch;
use crate::error::{StateError, StateResult};

/// Host-provided key-value ledger state.
///
/// All implementations must satisfy these invariants:
/// - `get` of an absent key returns `Ok(None)`, never an error.
/// - `apply` is all-or-nothing: either every write in the batch becomes
///   visible or none does.
/// - `apply` rejects the batch with [`StateError::Conflict`] if any key in
///   the batch's read set no longer holds the value that was observed.
/// - The state never interprets values.
pub trait KeyValueState: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Write a single value, outside of any batch.
    fn put(&self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Validate the batch's read set and apply its writes.
    ///
    /// The default implementation validates, then calls `put()` for each
    /// write. It is only atomic if nothing else writes concurrently; backends
    /// override it to check and write under one lock.
    fn apply(&self, batch: &WriteBatch) -> StateResult<()> {
        for (key, observed) in batch.reads() {
            if self.get(key)?.as_deref() != observed.as_deref() {
                return Err(StateError::Conflict { key: key.clone() });
            }
        }
        for (key, value) in batch.writes() {
            self.put(key, value)?;
        }
        Ok(())
    }
}
