//! Error types for the crypto crate.

use thiserror::Error;

/// Crypto-specific errors.
///
/// Signature mismatches are not errors; [`crate::SignatureVerifier::verify`]
/// returns `false` for those. These variants cover structural misuse only.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Public key material could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// Seal seed material has the wrong shape.
    #[error("invalid seal seed: {0}")]
    InvalidSeed(String),

    /// A value could not be canonically serialized.
    #[error("canonical serialization failed: {0}")]
    Canonical(String),
}

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
