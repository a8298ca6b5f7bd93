//! Validator configuration.

use chrono::Duration;
use keybound_crypto::SignatureVerifier;
use keybound_license::resolver::{
    ResolverConfig, DEFAULT_CACHE_TTL_SECS, DEFAULT_GRACE_WINDOW_SECS,
};

/// Tunables for the resolution protocol.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Upper bound on how long a resolved state stays fresh locally.
    /// Effective TTL is `min(server ttl, cache_ttl)`. Default: 24 hours.
    pub cache_ttl: Duration,
    /// How long past staleness a last known-good `Active` state is honored
    /// when the network fails. Default: 30 days.
    pub grace_window: Duration,
    /// Bound on the validation round-trip; elapsing classifies as a
    /// network error and routes into grace evaluation. Default: 10 s.
    pub network_timeout: std::time::Duration,
    /// Default public key for offline license files. Per-call options
    /// override it; with neither, offline validation is a configuration
    /// error.
    pub offline_public_key: Option<SignatureVerifier>,
    /// Public key for signed validation responses. A signed response with
    /// no key configured fails closed.
    pub response_public_key: Option<SignatureVerifier>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::seconds(DEFAULT_CACHE_TTL_SECS),
            grace_window: Duration::seconds(DEFAULT_GRACE_WINDOW_SECS),
            network_timeout: std::time::Duration::from_secs(10),
            offline_public_key: None,
            response_public_key: None,
        }
    }
}

impl ValidatorConfig {
    /// The pure-resolver view of this configuration.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cache_ttl: self.cache_ttl,
            grace_window: self.grace_window,
        }
    }
}
