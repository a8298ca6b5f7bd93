//! Shared test harness for validator tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use keybound_client::transport::mock::MockTransport;
use keybound_client::{FixedProbe, LicenseValidator, ValidatorConfig};
use keybound_license::resolver::{RemoteStatus, ValidationResponse};
use keybound_store::{MemoryBackend, StateStore};
use keybound_types::ManualClock;
use std::sync::Arc;

/// Fixed test epoch.
pub const T0: i64 = 1_700_000_000;

pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// A validator over a memory store, mock transport, and manual clock.
pub struct Harness {
    pub validator: LicenseValidator,
    pub transport: Arc<MockTransport>,
    pub clock: Arc<ManualClock>,
    pub backend: MemoryBackend,
}

/// Builds a harness with the given grace window and a 24 h cache TTL.
pub fn harness(grace_secs: i64) -> Harness {
    harness_with_config(ValidatorConfig {
        grace_window: Duration::seconds(grace_secs),
        ..ValidatorConfig::default()
    })
}

pub fn harness_with_config(config: ValidatorConfig) -> Harness {
    let backend = MemoryBackend::new();
    let store = StateStore::open(Box::new(backend.clone())).unwrap();
    let transport = Arc::new(MockTransport::new());
    let clock = Arc::new(ManualClock::at_epoch(T0));

    let validator = LicenseValidator::new(store, transport.clone(), config)
        .with_clock(clock.clone())
        .with_probe(Arc::new(FixedProbe::new("testos", Some("hw-test".to_string()))));

    Harness {
        validator,
        transport,
        clock,
        backend,
    }
}

/// An `active` response granting the given capabilities.
pub fn active_response(capabilities: &[&str], ttl: u64) -> ValidationResponse {
    ValidationResponse {
        status: RemoteStatus::Active,
        capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
        expires_at: None,
        ttl: Some(ttl),
        signature: None,
    }
}
