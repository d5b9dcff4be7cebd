use chrono::{DateTime, Utc};

/// Per-invocation values agreed on by every replica.
///
/// The ledger never reads a clock, a counter, or a random source of its own;
/// transaction identity and time come only from here.
pub trait InvocationContext {
    /// Identifier of the current invocation. Unique per invocation.
    fn transaction_id(&self) -> String;

    /// Timestamp of the current invocation, identical on every replica.
    fn transaction_timestamp(&self) -> DateTime<Utc>;
}

/// An [`InvocationContext`] with explicit values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedContext {
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

impl FixedContext {
    pub fn new(transaction_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            timestamp,
        }
    }
}

impl InvocationContext for FixedContext {
    fn transaction_id(&self) -> String {
        self.transaction_id.clone()
    }

    fn transaction_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
