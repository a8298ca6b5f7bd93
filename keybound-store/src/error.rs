//! Error types for the store crate.

use thiserror::Error;

/// Store-specific errors.
///
/// Read-side corruption never surfaces here; [`crate::StateStore::get`]
/// self-heals and reports absence. These variants cover write failures and
/// backend misuse.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend key contains path-unsafe characters.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Sealing a record failed.
    #[error("sealing failed: {0}")]
    Seal(String),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
