/// Errors from key-value state operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// A key read by the batch changed before the batch was applied.
    #[error("write conflict on key {key}")]
    Conflict { key: String },

    /// The backend refused the key (empty keys are never valid).
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// Serialization or deserialization failure of the backend's own format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted state could not be decoded.
    #[error("corrupt state file {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// A lock guarding the state was poisoned by a panicking writer.
    #[error("state lock poisoned")]
    LockPoisoned,
}

/// Result alias for state operations.
pub type StateResult<T> = Result<T, StateError>;
