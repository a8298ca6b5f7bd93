//! Cryptographic primitives for the Keybound SDK.
//!
//! Three concerns live here:
//!
//! - [`SignatureVerifier`]: detached Ed25519 verification against a public
//!   key (PEM, raw, or base64). Verification is infallible: malformed
//!   signatures and mismatches return `false`; only structurally invalid
//!   key material errors, and only at construction time.
//! - [`canonical`]: deterministic JSON serialization (lexicographic key
//!   order, no insignificant whitespace). Every signature in the SDK is
//!   computed over canonical bytes.
//! - [`StateSeal`]: a device-local Ed25519 signing key used to seal cached
//!   entitlement records so they are tamper-evident across restarts.

pub mod canonical;
mod error;
mod seal;
mod verifier;

pub use error::{CryptoError, CryptoResult};
pub use seal::StateSeal;
pub use verifier::SignatureVerifier;
