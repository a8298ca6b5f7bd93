//! Shared test helpers for license-core tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};
use keybound_crypto::canonical::to_canonical_bytes;
use keybound_crypto::SignatureVerifier;
use keybound_license::{EntitlementState, EntitlementStatus};
use keybound_types::{CapabilitySet, LicenseKey};
use serde_json::{json, Value};

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, SignatureVerifier) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let verifier = SignatureVerifier::from_bytes(&signing_key.verifying_key().to_bytes()).unwrap();
    (signing_key, verifier)
}

/// A second, unrelated key pair.
pub fn other_keypair() -> (SigningKey, SignatureVerifier) {
    let signing_key = SigningKey::from_bytes(&[77u8; 32]);
    let verifier = SignatureVerifier::from_bytes(&signing_key.verifying_key().to_bytes()).unwrap();
    (signing_key, verifier)
}

/// Epoch-seconds timestamp.
pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Signs the canonical bytes of a JSON value, returning base64.
pub fn sign_value(signing_key: &SigningKey, value: &Value) -> String {
    let payload = to_canonical_bytes(value).unwrap();
    BASE64.encode(signing_key.sign(&payload).to_bytes())
}

/// Builds a signed offline license document around a `license` object.
pub fn make_offline_doc(signing_key: &SigningKey, license: Value) -> Value {
    let unsigned = json!({ "license": license });
    let signature = sign_value(signing_key, &unsigned);
    json!({ "license": unsigned["license"], "signature": signature })
}

/// Builds an entitlement state with the given time bounds.
pub fn entitlement(
    key: &str,
    status: EntitlementStatus,
    capabilities: &[&str],
    issued_at: i64,
    expires_at: Option<i64>,
    revalidate_after: i64,
) -> EntitlementState {
    let caps: CapabilitySet = capabilities.iter().map(|c| (*c).into()).collect();
    EntitlementState::new(
        LicenseKey::new(key).unwrap(),
        status,
        caps,
        ts(issued_at),
        expires_at.map(ts),
        ts(revalidate_after),
    )
    .unwrap()
}
