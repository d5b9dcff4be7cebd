use loyalty_state::StateError;
use loyalty_types::TypeError;

/// Error categories callers match on.
///
/// Message text is for humans; [`LedgerError::kind`] is the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    AccountNotFound,
    PartnerNotFound,
    DuplicateAccount,
    DuplicateTransaction,
    InsufficientBalance,
    NotInitialized,
    StateReadFailure,
    StateWriteFailure,
}

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("partner not found: {0}")]
    PartnerNotFound(String),

    #[error("account already exists: {0}")]
    DuplicateAccount(String),

    #[error("transaction already recorded: {0}")]
    DuplicateTransaction(String),

    #[error("insufficient balance in {account}: has {balance}, needs {requested}")]
    InsufficientBalance {
        account: String,
        balance: i64,
        requested: i64,
    },

    #[error("ledger not initialized")]
    NotInitialized,

    #[error("read {key}: {reason}")]
    StateReadFailure { key: String, reason: String },

    #[error("apply write set: {0}")]
    StateWriteFailure(#[source] StateError),

    /// Any of the above, annotated with the operation that raised it.
    #[error("failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<LedgerError>,
    },
}

impl LedgerError {
    /// The category of this error, looking through operation annotations.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::PartnerNotFound(_) => ErrorKind::PartnerNotFound,
            Self::DuplicateAccount(_) => ErrorKind::DuplicateAccount,
            Self::DuplicateTransaction(_) => ErrorKind::DuplicateTransaction,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::StateReadFailure { .. } => ErrorKind::StateReadFailure,
            Self::StateWriteFailure(_) => ErrorKind::StateWriteFailure,
            Self::Operation { source, .. } => source.kind(),
        }
    }

    /// The operation this error was raised in, if annotated.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Annotate with the failing operation. Already-annotated errors keep
    /// their innermost operation.
    pub(crate) fn during(self, operation: &'static str) -> Self {
        match self {
            Self::Operation { .. } => self,
            other => Self::Operation {
                operation,
                source: Box::new(other),
            },
        }
    }

    pub(crate) fn read_failure(key: &str, reason: impl ToString) -> Self {
        Self::StateReadFailure {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<TypeError> for LedgerError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
