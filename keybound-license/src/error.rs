//! Error types for the license core.

use thiserror::Error;

/// License-core errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// An offline license document is structurally unusable (malformed
    /// JSON, missing `license` or `signature`). Distinct from a
    /// verification failure, which is reported in the validation result.
    #[error("invalid offline license: {0}")]
    Validation(String),

    /// A signature that must verify did not (signed remote response with a
    /// mismatching or unverifiable signature). Fail closed.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// Entitlement fields violate a state invariant.
    #[error("invalid entitlement state: {0}")]
    InvalidState(String),

    /// Crypto-layer failure (key material, canonicalization).
    #[error(transparent)]
    Crypto(#[from] keybound_crypto::CryptoError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license-core operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
