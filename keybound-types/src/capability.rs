//! Capability names gated by license entitlement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named permission granted by a license (e.g. `updates`, `downloads`).
///
/// Capabilities compare case-sensitively; the server is the authority on
/// naming. The ordered [`CapabilitySet`] keeps canonical serializations of
/// entitlement records deterministic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Creates a capability from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the capability name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Capability {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Debug for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Capability({})", self.0)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered set of capabilities.
pub type CapabilitySet = BTreeSet<Capability>;
