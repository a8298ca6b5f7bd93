//! Detached Ed25519 signature verification.
//!
//! The verifier is stateless and performs no I/O. The caller is responsible
//! for producing the exact canonical byte sequence that was signed (see
//! [`crate::canonical`]); the verifier only answers whether the signature
//! matches those bytes under its public key.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verifies detached Ed25519 signatures against one public key.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Builds a verifier from a PEM-encoded public key document
    /// (`-----BEGIN PUBLIC KEY-----`).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the document does not parse
    /// as an Ed25519 public key.
    pub fn from_pem(pem: &str) -> CryptoResult<Self> {
        let key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| CryptoError::InvalidKey(format!("PEM parse failed: {e}")))?;
        Ok(Self { key })
    }

    /// Builds a verifier from raw 32-byte key material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the bytes are not a valid
    /// curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> CryptoResult<Self> {
        let key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("not a valid Ed25519 key: {e}")))?;
        Ok(Self { key })
    }

    /// Builds a verifier from base64-encoded raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] on bad base64, wrong length, or
    /// an invalid curve point.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("invalid base64: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("key must be 32 bytes".to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Verifies a base64-encoded detached signature over `payload`.
    ///
    /// Never errors: malformed base64, wrong-length signatures, and plain
    /// mismatches all return `false`.
    #[must_use]
    pub fn verify(&self, payload: &[u8], signature_b64: &str) -> bool {
        let Ok(sig_bytes) = BASE64.decode(signature_b64.trim()) else {
            return false;
        };
        self.verify_raw(payload, &sig_bytes)
    }

    /// Verifies a raw detached signature over `payload`.
    #[must_use]
    pub fn verify_raw(&self, payload: &[u8], signature: &[u8]) -> bool {
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        self.key.verify(payload, &sig).is_ok()
    }

    /// Returns the raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("public_key", &BASE64.encode(self.key.to_bytes()))
            .finish()
    }
}
