//! Pure resolution decisions.
//!
//! Nothing here performs I/O. Each function takes the inputs of a decision
//! (a remote response, a stale cached state, an explicit `now`) and
//! returns the state the protocol requires. The orchestration layer wires
//! these to the store and the transport.
//!
//! Remote status table:
//!
//! | remote `status` | HTTP analog | [`EntitlementStatus`] |
//! |-----------------|-------------|-----------------------|
//! | `active`        | 200         | `Active`              |
//! | `expired`       | 410         | `Expired`             |
//! | `suspended`     | 403         | `Suspended`           |
//! | `not_found`     | 404         | `NotFound`            |

use crate::entitlement::{EntitlementState, EntitlementStatus};
use crate::error::{LicenseError, LicenseResult};
use crate::state::LicenseState;
use chrono::{DateTime, Duration, Utc};
use keybound_crypto::canonical::to_canonical_bytes;
use keybound_crypto::SignatureVerifier;
use keybound_types::{Capability, CapabilitySet, LicenseKey};
use serde::{Deserialize, Serialize};

/// Default local cache TTL: 24 hours.
pub const DEFAULT_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Default grace window: 30 days.
pub const DEFAULT_GRACE_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// License status as reported by the validation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Active,
    Expired,
    Suspended,
    NotFound,
}

impl RemoteStatus {
    /// Maps a definitive HTTP error status to a remote license status.
    ///
    /// Returns `None` for codes that carry no license meaning (those stay
    /// remote errors and are surfaced as such).
    #[must_use]
    pub fn from_http_status(code: u16) -> Option<Self> {
        match code {
            403 => Some(Self::Suspended),
            404 => Some(Self::NotFound),
            410 => Some(Self::Expired),
            _ => None,
        }
    }

    /// The entitlement status this remote status resolves to.
    #[must_use]
    pub fn entitlement_status(self) -> EntitlementStatus {
        match self {
            Self::Active => EntitlementStatus::Active,
            Self::Expired => EntitlementStatus::Expired,
            Self::Suspended => EntitlementStatus::Suspended,
            Self::NotFound => EntitlementStatus::NotFound,
        }
    }
}

/// A validation response from the service.
///
/// Optional fields are omitted (not null) in the serialized form; the
/// response signature, when present, covers the canonical bytes of the
/// remaining fields in exactly that representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResponse {
    /// Resolved license status.
    pub status: RemoteStatus,
    /// Capability names granted to this license.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    /// License expiry, if the license expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Server-suggested revalidation TTL in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Detached signature over the canonical response payload, when the
    /// service signs responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Tunables for pure resolution decisions.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on how long a resolved state stays fresh locally.
    pub cache_ttl: Duration,
    /// How long past staleness a last known-good `Active` state is still
    /// honored when the network fails.
    pub grace_window: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS),
            grace_window: Duration::seconds(DEFAULT_GRACE_WINDOW_SECS),
        }
    }
}

/// Maps a validation response into an entitlement state resolved at `now`.
///
/// `revalidate_after` is `now + min(server ttl, local cache_ttl)`, clamped
/// to `expires_at` so a state is never fresher than the license is long.
///
/// If the response carries a signature it must verify against
/// `response_verifier` over the canonical response payload (signature field
/// removed); a signed response with no configured verifier also fails
/// closed. Unsigned responses are accepted, since the service only signs
/// offline license files today.
///
/// # Errors
///
/// Returns [`LicenseError::Signature`] when a signed response does not
/// verify, and [`LicenseError::InvalidState`] if the response's time bounds
/// cannot form a valid state.
pub fn resolve_from_validation(
    response: &ValidationResponse,
    license_key: &LicenseKey,
    now: DateTime<Utc>,
    config: &ResolverConfig,
    response_verifier: Option<&SignatureVerifier>,
) -> LicenseResult<EntitlementState> {
    if let Some(signature) = &response.signature {
        let Some(verifier) = response_verifier else {
            return Err(LicenseError::Signature(
                "response is signed but no response public key is configured".to_string(),
            ));
        };
        let mut value = serde_json::to_value(response)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("signature");
        }
        let payload = to_canonical_bytes(&value)?;
        if !verifier.verify(&payload, signature) {
            return Err(LicenseError::Signature(
                "validation response signature does not verify".to_string(),
            ));
        }
    }

    let server_ttl = response
        .ttl
        .map(|secs| Duration::seconds(secs.min(i64::MAX as u64) as i64));
    let effective_ttl = match server_ttl {
        Some(ttl) => ttl.min(config.cache_ttl),
        None => config.cache_ttl,
    };

    // An already-expired license was necessarily issued no later than its
    // expiry; keeping issued_at ≤ expires_at preserves the state invariant.
    let issued_at = match response.expires_at {
        Some(expires_at) if expires_at < now => expires_at,
        _ => now,
    };

    let mut revalidate_after = now + effective_ttl;
    if let Some(expires_at) = response.expires_at {
        revalidate_after = revalidate_after.min(expires_at);
    }

    let capabilities: CapabilitySet = response
        .capabilities
        .iter()
        .map(|name| Capability::from(name.as_str()))
        .collect();

    EntitlementState::new(
        license_key.clone(),
        response.status.entitlement_status(),
        capabilities,
        issued_at,
        response.expires_at,
        revalidate_after,
    )
}

/// Evaluates the grace policy against a stale cached state.
///
/// Returns a `Grace` state iff the stale state is `Active` and `now` is
/// within `grace_window` of its `revalidate_after`. Returns `None`
/// otherwise and the caller escalates to [`restricted`]. A non-active
/// stale state never grants, regardless of the window.
#[must_use]
pub fn grace_state(
    stale: &EntitlementState,
    now: DateTime<Utc>,
    grace_window: Duration,
) -> Option<LicenseState> {
    if !stale.status().is_active() {
        return None;
    }
    let grace_until = stale.revalidate_after() + grace_window;
    if now > grace_until {
        return None;
    }
    Some(LicenseState::Grace {
        entitlement: stale.clone(),
        grace_until,
    })
}

/// The universal safe default: a state that grants nothing.
#[must_use]
pub fn restricted(reason: impl Into<String>) -> LicenseState {
    LicenseState::Restricted {
        reason: reason.into(),
    }
}
