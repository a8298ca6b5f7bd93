//! Device-local record sealing.
//!
//! Cached entitlement records contain locally-computed fields
//! (`revalidate_after`, the nonce) that no remote signature can attest.
//! The seal is an Ed25519 signing key generated on this device from OS
//! randomness; the store signs every record it persists and verifies on
//! read. A record copied from another machine fails verification because
//! the seed never leaves the device.

use crate::error::{CryptoError, CryptoResult};
use crate::verifier::SignatureVerifier;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signer, SigningKey};
use rand::RngCore;

/// Length of a seal seed in bytes.
pub const SEAL_SEED_SIZE: usize = 32;

/// A device-local Ed25519 signing key for sealing persisted records.
#[derive(Clone)]
pub struct StateSeal {
    signing_key: SigningKey,
}

impl StateSeal {
    /// Generates a fresh seal from OS randomness.
    #[must_use]
    pub fn generate() -> Self {
        let mut seed = [0u8; SEAL_SEED_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Reconstructs a seal from a persisted seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; SEAL_SEED_SIZE]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Reconstructs a seal from a persisted seed slice.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSeed`] if the slice is not exactly
    /// [`SEAL_SEED_SIZE`] bytes.
    pub fn from_seed_slice(seed: &[u8]) -> CryptoResult<Self> {
        let seed: [u8; SEAL_SEED_SIZE] = seed
            .try_into()
            .map_err(|_| CryptoError::InvalidSeed(format!("expected {SEAL_SEED_SIZE} bytes")))?;
        Ok(Self::from_seed(&seed))
    }

    /// Returns the seed bytes for persistence.
    #[must_use]
    pub fn seed(&self) -> [u8; SEAL_SEED_SIZE] {
        self.signing_key.to_bytes()
    }

    /// Signs a canonical payload, returning the base64 detached signature.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        let signature = self.signing_key.sign(payload);
        BASE64.encode(signature.to_bytes())
    }

    /// Returns a verifier for signatures produced by this seal.
    #[must_use]
    pub fn verifier(&self) -> SignatureVerifier {
        SignatureVerifier::from_bytes(&self.signing_key.verifying_key().to_bytes())
            .expect("key derived from a valid signing key")
    }
}

impl std::fmt::Debug for StateSeal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSeal")
            .field("seed", &"[REDACTED]")
            .finish()
    }
}
