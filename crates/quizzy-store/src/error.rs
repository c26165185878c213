//! Store error types.

use thiserror::Error;

/// Errors that can occur when appending to a result store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote store returned a non-success status.
    #[error("store error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The remote store could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// A local store file could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}
