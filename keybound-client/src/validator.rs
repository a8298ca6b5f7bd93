//! The offline-first resolution orchestrator.

use crate::cache::ResponseCache;
use crate::config::ValidatorConfig;
use crate::error::{ClientError, ClientResult};
use crate::probe::{EnvironmentProbe, SystemProbe};
use crate::transport::{TransportError, ValidationRequest, ValidationTransport};
use keybound_crypto::SignatureVerifier;
use keybound_license::resolver::{self, RemoteStatus, ValidationResponse};
use keybound_license::{
    validate_offline, EntitlementState, LicenseError, LicenseState, OfflineLicenseData,
    OfflineOptions, OfflineValidation,
};
use keybound_store::StateStore;
use keybound_types::{Clock, LicenseKey, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Endpoint tag for validation responses in the derived cache.
const VALIDATE_ENDPOINT: &str = "validate";

/// Per-call options for state resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Skip the fresh-cache short-circuit and force a network round-trip.
    pub force_refresh: bool,
    /// Hardware identifier override; defaults to the environment probe's.
    pub hardware_id: Option<String>,
    /// Product identifier when one account spans several products.
    pub product: Option<String>,
}

/// Per-call options for offline license validation.
#[derive(Debug, Clone, Default)]
pub struct OfflineValidateOptions {
    /// Public key override; defaults to the configured offline key.
    pub public_key: Option<SignatureVerifier>,
    /// Hardware identifier override; defaults to the environment probe's.
    pub hardware_id: Option<String>,
}

/// Orchestrates the offline-first license resolution protocol.
///
/// See the crate docs for the protocol. All methods are `&self`; the
/// validator is meant to be shared (`Arc`) across an application.
pub struct LicenseValidator {
    store: StateStore,
    transport: Arc<dyn ValidationTransport>,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn EnvironmentProbe>,
    config: ValidatorConfig,
    response_cache: ResponseCache,
    /// Per-key single-flight guards; followers on a key await the leader's
    /// request instead of issuing their own.
    inflight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl LicenseValidator {
    /// Creates a validator with the production clock and probe.
    #[must_use]
    pub fn new(
        store: StateStore,
        transport: Arc<dyn ValidationTransport>,
        config: ValidatorConfig,
    ) -> Self {
        Self {
            store,
            transport,
            clock: Arc::new(SystemClock),
            probe: Arc::new(SystemProbe),
            config,
            response_cache: ResponseCache::new(),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the environment probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// The derived response cache, for SDK layers above this core.
    #[must_use]
    pub fn response_cache(&self) -> &ResponseCache {
        &self.response_cache
    }

    /// Resolves the current license state for a key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] for a malformed key and
    /// propagates unrecoverable non-network errors (store writes, signed
    /// responses that fail verification, remote errors carrying no license
    /// status). Network failures do not error; they resolve to `Grace` or
    /// `Restricted` per the grace policy.
    pub async fn resolve_license_state(
        &self,
        key: &str,
        options: &ResolveOptions,
    ) -> ClientResult<LicenseState> {
        let license_key =
            LicenseKey::new(key).map_err(|e| ClientError::Configuration(e.to_string()))?;

        if !options.force_refresh {
            if let Some(state) = self.fresh_from_store(&license_key) {
                return Ok(LicenseState::Fresh(state));
            }
        }

        self.revalidate(&license_key, options).await
    }

    /// Like [`LicenseValidator::resolve_license_state`], but never fails:
    /// any error becomes a restricted state carrying the error text.
    pub async fn get_license_state(&self, key: &str, options: &ResolveOptions) -> LicenseState {
        match self.resolve_license_state(key, options).await {
            Ok(state) => state,
            Err(e) => resolver::restricted(e.to_string()),
        }
    }

    /// Resolves state and demands a capability.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::State`] naming the capability and the
    /// license status when the resolved state does not allow it, plus
    /// anything [`LicenseValidator::resolve_license_state`] can return.
    pub async fn require_capability(
        &self,
        key: &str,
        capability: &str,
    ) -> ClientResult<LicenseState> {
        let state = self
            .resolve_license_state(key, &ResolveOptions::default())
            .await?;
        if state.allows(capability) {
            return Ok(state);
        }
        let status = state
            .status()
            .map_or_else(|| "restricted".to_string(), |s| s.to_string());
        Err(ClientError::State {
            capability: capability.to_string(),
            status,
        })
    }

    /// Verifies a standalone offline license document. No cache, no
    /// network.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for structural misuse
    /// (malformed JSON, missing `license`/`signature`) and
    /// [`ClientError::Configuration`] when no public key is available.
    /// Verification failures do not error; they accumulate in the
    /// returned [`OfflineValidation`].
    pub fn validate_offline_license(
        &self,
        data: impl Into<OfflineLicenseData>,
        options: &OfflineValidateOptions,
    ) -> ClientResult<OfflineValidation> {
        let verifier = options
            .public_key
            .as_ref()
            .or(self.config.offline_public_key.as_ref())
            .ok_or_else(|| {
                ClientError::Configuration("no offline public key configured".to_string())
            })?;

        let offline_options = OfflineOptions {
            hardware_id: options
                .hardware_id
                .clone()
                .or_else(|| self.probe.hardware_id()),
        };

        validate_offline(&data.into(), verifier, self.clock.now(), &offline_options).map_err(
            |e| match e {
                LicenseError::Validation(message) => ClientError::Validation(message),
                other => ClientError::License(other),
            },
        )
    }

    /// Deletes the stored record and all derived cache entries for a key.
    /// Idempotent; a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] for a malformed key; backend
    /// delete failures propagate as [`ClientError::Store`].
    pub fn clear_license_state(&self, key: &str) -> ClientResult<()> {
        let license_key =
            LicenseKey::new(key).map_err(|e| ClientError::Configuration(e.to_string()))?;
        self.store.clear(&license_key)?;
        self.response_cache.purge(&license_key);
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────

    fn fresh_from_store(&self, license_key: &LicenseKey) -> Option<EntitlementState> {
        let state = self.store.get(license_key)?;
        if state.is_stale(self.clock.now()) {
            return None;
        }
        debug!(key = %license_key, "fresh cache hit, skipping network");
        Some(state)
    }

    async fn revalidate(
        &self,
        license_key: &LicenseKey,
        options: &ResolveOptions,
    ) -> ClientResult<LicenseState> {
        let guard = self.inflight_guard(license_key).await;
        let _in_flight = guard.lock().await;

        // A leader may have refreshed the record while we waited.
        if !options.force_refresh {
            if let Some(state) = self.fresh_from_store(license_key) {
                return Ok(LicenseState::Fresh(state));
            }
        }

        let request = self.validation_request(options);
        let outcome = match tokio::time::timeout(
            self.config.network_timeout,
            self.transport.validate(license_key, &request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Network(format!(
                "validation timed out after {:?}",
                self.config.network_timeout
            ))),
        };

        match outcome {
            Ok(response) => {
                let sealed = self.accept_response(license_key, &response)?;
                Ok(LicenseState::Fresh(sealed))
            }
            Err(TransportError::Remote { status, message }) => {
                // A definitive license status is authoritative: it
                // overwrites the cache and never grants grace.
                if let Some(remote_status) = RemoteStatus::from_http_status(status) {
                    debug!(key = %license_key, status, "definitive remote rejection");
                    let response = ValidationResponse {
                        status: remote_status,
                        capabilities: Vec::new(),
                        expires_at: None,
                        ttl: None,
                        signature: None,
                    };
                    let sealed = self.accept_response(license_key, &response)?;
                    Ok(LicenseState::Fresh(sealed))
                } else {
                    Err(ClientError::Remote { status, message })
                }
            }
            Err(TransportError::Network(message)) => {
                warn!(key = %license_key, error = %message, "network failure, evaluating grace");
                Ok(self.grace_or_restrict(license_key, message))
            }
        }
    }

    /// Maps, seals, and persists a validation response; records the raw
    /// payload in the derived cache.
    fn accept_response(
        &self,
        license_key: &LicenseKey,
        response: &ValidationResponse,
    ) -> ClientResult<EntitlementState> {
        let state = resolver::resolve_from_validation(
            response,
            license_key,
            self.clock.now(),
            &self.config.resolver_config(),
            self.config.response_public_key.as_ref(),
        )?;
        let sealed = self.store.set(state)?;
        self.response_cache.insert(
            license_key,
            VALIDATE_ENDPOINT,
            serde_json::to_value(response).map_err(LicenseError::from)?,
            sealed.revalidate_after(),
        );
        Ok(sealed)
    }

    /// Grace evaluation after a network failure. The restriction reason is
    /// the original network error, so diagnosability survives the
    /// non-throwing path.
    fn grace_or_restrict(&self, license_key: &LicenseKey, network_error: String) -> LicenseState {
        let now = self.clock.now();
        if let Some(stale) = self.store.get(license_key) {
            if let Some(state) = resolver::grace_state(&stale, now, self.config.grace_window) {
                warn!(key = %license_key, "honoring stale entitlement inside grace window");
                return state;
            }
        }
        resolver::restricted(network_error)
    }

    fn validation_request(&self, options: &ResolveOptions) -> ValidationRequest {
        ValidationRequest {
            hardware_id: options
                .hardware_id
                .clone()
                .or_else(|| self.probe.hardware_id()),
            os_name: Some(self.probe.os_name()),
            product: options.product.clone(),
        }
    }

    async fn inflight_guard(&self, license_key: &LicenseKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inflight.lock().await;
        map.entry(license_key.storage_key())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

impl std::fmt::Debug for LicenseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
