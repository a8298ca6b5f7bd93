//! The unified client error taxonomy.

use thiserror::Error;

/// Errors surfaced by the validator.
///
/// Only [`ClientError::Network`] ever triggers grace fallback, and the
/// validator handles that internally; a caller who sees it means the
/// transport failed outside a resolution. Everything else propagates
/// untouched; [`crate::LicenseValidator::get_license_state`] is the single
/// point that converts any of these into a restricted state.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller misuse: empty license key, missing key material.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Structurally unusable offline license input.
    #[error("invalid offline license: {0}")]
    Validation(String),

    /// Connectivity or timeout failure talking to the service.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered definitively with an error that carries no
    /// license status (e.g. 500, 429). Authoritative; no grace fallback.
    #[error("remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// A required capability was denied.
    #[error("capability `{capability}` denied (license status: {status})")]
    State {
        /// The capability that was checked.
        capability: String,
        /// The license status at denial time (`restricted` when no
        /// entitlement was available).
        status: String,
    },

    /// License-core failure (signature, invariants).
    #[error(transparent)]
    License(#[from] keybound_license::LicenseError),

    /// Store write failure.
    #[error(transparent)]
    Store(#[from] keybound_store::StoreError),
}

/// Result type for validator operations.
pub type ClientResult<T> = Result<T, ClientError>;
