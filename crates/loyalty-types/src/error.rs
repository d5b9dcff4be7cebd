use thiserror::Error;

/// Errors produced while decoding or validating records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unknown role: {0} (expected \"member\" or \"partner\")")]
    UnknownRole(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
