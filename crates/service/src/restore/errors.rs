use thiserror::Error;

use crate::errors::ServiceError;

/// Errors raised by a restore run.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Malformed JSON, a non-array top level, or a record without a string `key`.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unsupported strategy: {0:?} (expected one of replace, merge, keep)")]
    UnsupportedStrategy(String),
    /// The input source could not be read.
    #[error("cannot read input: {0}")]
    Io(String),
    #[error("store operation failed: {0}")]
    Store(#[from] ServiceError),
}

impl RestoreError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RestoreError::InvalidInput(_) => 2001,
            RestoreError::UnsupportedStrategy(_) => 2002,
            RestoreError::Io(_) => 2003,
            RestoreError::Store(_) => 2100,
        }
    }
}
