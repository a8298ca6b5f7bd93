//! The external-facing read model of a resolution.
//!
//! Every resolution path produces a [`LicenseState`]: fresh from the
//! service, grace from a stale cache, or restricted. Callers never see
//! exception-driven degrade paths, only an explicit result.

use crate::entitlement::{EntitlementState, EntitlementStatus};
use chrono::{DateTime, Utc};
use keybound_types::Capability;
use serde::{Deserialize, Serialize};

/// Where a resolved state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Resolved from the service (or a cache record still inside its TTL).
    Fresh,
    /// A stale record honored inside the grace window after a network
    /// failure.
    Grace,
    /// Forced restriction; grants nothing.
    Restricted,
}

/// The result of resolving a license key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseState {
    /// A current entitlement, straight from the service or a fresh cache.
    Fresh(EntitlementState),
    /// A stale entitlement honored under the grace policy.
    Grace {
        /// The last known-good entitlement.
        entitlement: EntitlementState,
        /// The instant the grace window closes.
        grace_until: DateTime<Utc>,
    },
    /// No entitlement; the reason records what forced the restriction.
    Restricted {
        /// Human-readable cause (e.g. the original network error).
        reason: String,
    },
}

impl LicenseState {
    /// Returns the provenance tag for this state.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Fresh(_) => Provenance::Fresh,
            Self::Grace { .. } => Provenance::Grace,
            Self::Restricted { .. } => Provenance::Restricted,
        }
    }

    /// Returns true iff this state currently allows the capability.
    ///
    /// True only for `Fresh`/`Grace` states whose entitlement is `Active`
    /// and contains the capability. Restricted states allow nothing.
    #[must_use]
    pub fn allows(&self, capability: &str) -> bool {
        match self.entitlement() {
            Some(entitlement) => entitlement.grants(&Capability::from(capability)),
            None => false,
        }
    }

    /// Returns the entitlement status, or `None` when restricted.
    #[must_use]
    pub fn status(&self) -> Option<EntitlementStatus> {
        self.entitlement().map(EntitlementState::status)
    }

    /// Returns the wrapped entitlement, or `None` when restricted.
    #[must_use]
    pub fn entitlement(&self) -> Option<&EntitlementState> {
        match self {
            Self::Fresh(entitlement) | Self::Grace { entitlement, .. } => Some(entitlement),
            Self::Restricted { .. } => None,
        }
    }

    /// Returns the restriction reason, or `None` for usable states.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Restricted { reason } => Some(reason),
            _ => None,
        }
    }

    /// Returns true when this is a restricted state.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted { .. })
    }
}
