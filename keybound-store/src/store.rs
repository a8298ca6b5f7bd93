//! The sealed entitlement store.

use crate::backend::StorageBackend;
use crate::error::{StoreError, StoreResult};
use keybound_crypto::StateSeal;
use keybound_license::EntitlementState;
use keybound_types::LicenseKey;
use tracing::{debug, warn};

/// Reserved backend key holding the device-local seal seed.
const SEAL_KEY: &str = "seal";

/// Persists one sealed [`EntitlementState`] per license key.
///
/// Records are keyed by [`LicenseKey::storage_key`] (a digest; the raw
/// key never reaches the medium) and signed with the device-local seal.
/// Any record that fails to parse, violates a state invariant, or does not
/// verify is removed on read and reported absent; the caller re-fetches.
pub struct StateStore {
    backend: Box<dyn StorageBackend>,
    seal: StateSeal,
}

impl StateStore {
    /// Opens a store over a backend, loading or creating the seal seed.
    ///
    /// An unreadable seal seed is replaced with a fresh one; every record
    /// sealed under the old seed then self-heals to absent on first read.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails.
    pub fn open(backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        let seal = match backend.read(SEAL_KEY)? {
            Some(seed) => match StateSeal::from_seed_slice(&seed) {
                Ok(seal) => seal,
                Err(e) => {
                    warn!(error = %e, "seal seed unreadable, regenerating");
                    let seal = StateSeal::generate();
                    backend.write(SEAL_KEY, &seal.seed())?;
                    seal
                }
            },
            None => {
                let seal = StateSeal::generate();
                backend.write(SEAL_KEY, &seal.seed())?;
                seal
            }
        };
        Ok(Self { backend, seal })
    }

    /// Retrieves the sealed state for a license key.
    ///
    /// Returns `None` when no record exists, or when the stored record is
    /// corrupt or fails seal verification, in which case the record is
    /// deleted so the next resolution re-fetches.
    #[must_use]
    pub fn get(&self, key: &LicenseKey) -> Option<EntitlementState> {
        let record_key = key.storage_key();
        let bytes = match self.backend.read(&record_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(record = %&record_key[..8], error = %e, "backend read failed");
                return None;
            }
        };

        match self.decode_and_verify(&bytes, key) {
            Ok(state) => {
                debug!(record = %&record_key[..8], status = %state.status(), "record loaded");
                Some(state)
            }
            Err(reason) => {
                warn!(record = %&record_key[..8], %reason, "discarding unusable record");
                if let Err(e) = self.backend.delete(&record_key) {
                    warn!(record = %&record_key[..8], error = %e, "failed to delete record");
                }
                None
            }
        }
    }

    /// Seals and persists a state, returning the sealed copy.
    ///
    /// Last write wins; there are no merge semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if sealing or the backend write fails.
    pub fn set(&self, state: EntitlementState) -> StoreResult<EntitlementState> {
        let payload = state
            .signing_payload()
            .map_err(|e| StoreError::Seal(e.to_string()))?;
        let sealed = state.with_signature(self.seal.sign(&payload));
        let bytes = serde_json::to_vec(&sealed)?;
        self.backend
            .write(&sealed.license_key().storage_key(), &bytes)?;
        Ok(sealed)
    }

    /// Deletes the record for a license key. Idempotent; absent is fine.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend delete itself fails.
    pub fn clear(&self, key: &LicenseKey) -> StoreResult<()> {
        self.backend.delete(&key.storage_key())
    }

    fn decode_and_verify(
        &self,
        bytes: &[u8],
        key: &LicenseKey,
    ) -> Result<EntitlementState, String> {
        let state: EntitlementState =
            serde_json::from_slice(bytes).map_err(|e| format!("record does not parse: {e}"))?;

        state
            .check_invariants()
            .map_err(|e| format!("invariant violation: {e}"))?;

        if state.license_key().storage_key() != key.storage_key() {
            return Err("record belongs to a different license key".to_string());
        }

        let Some(signature) = state.signature() else {
            return Err("record is unsealed".to_string());
        };
        let payload = state
            .signing_payload()
            .map_err(|e| format!("cannot rebuild signing payload: {e}"))?;
        if !self.seal.verifier().verify(&payload, signature) {
            return Err("seal signature mismatch".to_string());
        }

        Ok(state)
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}
