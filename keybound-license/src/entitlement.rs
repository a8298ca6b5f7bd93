//! The resolved facts about a license.
//!
//! An [`EntitlementState`] is an immutable value object: the status and
//! capability set the service attested for a license key, the time bounds
//! that govern when the record must be refreshed, and (once persisted) the
//! detached seal signature that makes the record tamper-evident.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use keybound_crypto::canonical::to_canonical_bytes;
use keybound_types::{Capability, CapabilitySet, LicenseKey};
use serde::{Deserialize, Serialize};

/// The resolved status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementStatus {
    /// License is valid; capabilities apply.
    Active,
    /// License term has ended.
    Expired,
    /// License was suspended by the service.
    Suspended,
    /// The service does not know this key.
    NotFound,
}

impl EntitlementStatus {
    /// Returns true for the only status that ever grants capabilities.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for EntitlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
            Self::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// The resolved facts about a license, immutable once constructed.
///
/// The serde representation is exactly the persisted record layout:
/// `{license_key, status, capabilities, issued_at, expires_at,
/// revalidate_after, nonce, signature}`. The signature, when present,
/// covers the canonical serialization of every other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementState {
    license_key: LicenseKey,
    status: EntitlementStatus,
    capabilities: CapabilitySet,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    revalidate_after: DateTime<Utc>,
    nonce: String,
    signature: Option<String>,
}

impl EntitlementState {
    /// Creates a new unsigned entitlement state with a fresh nonce.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidState`] if the time bounds violate
    /// an invariant (`expires_at < issued_at`, or `revalidate_after`
    /// past `expires_at`).
    pub fn new(
        license_key: LicenseKey,
        status: EntitlementStatus,
        capabilities: CapabilitySet,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        revalidate_after: DateTime<Utc>,
    ) -> LicenseResult<Self> {
        let state = Self {
            license_key,
            status,
            capabilities,
            issued_at,
            expires_at,
            revalidate_after,
            nonce: uuid::Uuid::new_v4().to_string(),
            signature: None,
        };
        state.check_invariants()?;
        Ok(state)
    }

    /// Validates the time-bound invariants.
    ///
    /// The store calls this after deserializing a persisted record; a
    /// violation there means the record was tampered with or corrupted.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidState`] naming the violated bound.
    pub fn check_invariants(&self) -> LicenseResult<()> {
        if let Some(expires_at) = self.expires_at {
            if expires_at < self.issued_at {
                return Err(LicenseError::InvalidState(format!(
                    "expires_at {expires_at} precedes issued_at {}",
                    self.issued_at
                )));
            }
            if self.revalidate_after > expires_at {
                return Err(LicenseError::InvalidState(format!(
                    "revalidate_after {} past expires_at {expires_at}",
                    self.revalidate_after
                )));
            }
        }
        Ok(())
    }

    /// Returns the license key this state describes.
    #[must_use]
    pub fn license_key(&self) -> &LicenseKey {
        &self.license_key
    }

    /// Returns the resolved status.
    #[must_use]
    pub fn status(&self) -> EntitlementStatus {
        self.status
    }

    /// Returns the capability set as stored.
    ///
    /// Callers gating access should use [`EntitlementState::grants`], which
    /// treats the set as empty for every status but `Active`.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Returns true iff the status is `Active` and the capability is in
    /// the stored set. Non-active states grant nothing regardless of what
    /// the set contains.
    #[must_use]
    pub fn grants(&self, capability: &Capability) -> bool {
        self.status.is_active() && self.capabilities.contains(capability)
    }

    /// Returns when this state was resolved.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the license expiry, if the license expires at all.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the instant after which this state must be refreshed.
    #[must_use]
    pub fn revalidate_after(&self) -> DateTime<Utc> {
        self.revalidate_after
    }

    /// Returns true once `now` is past `revalidate_after`.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now > self.revalidate_after
    }

    /// Returns the anti-replay nonce bound into the seal signature.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the detached seal signature, if this state was sealed.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Returns a copy carrying the given seal signature.
    #[must_use]
    pub fn with_signature(mut self, signature: String) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Returns the canonical bytes the seal signature covers: every field
    /// except `signature`, keys in lexicographic order, no whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, which indicates a bug
    /// rather than bad input.
    pub fn signing_payload(&self) -> LicenseResult<Vec<u8>> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("signature");
        }
        Ok(to_canonical_bytes(&value)?)
    }
}
