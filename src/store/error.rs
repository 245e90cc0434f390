//! Session store error types.

use thiserror::Error;

/// Errors raised while reading or writing saved sessions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document is not valid JSON for this schema.
    #[error("Session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The store refused the operation.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}
