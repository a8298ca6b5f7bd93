use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signer, SigningKey};
use keybound_crypto::canonical::to_canonical_bytes;
use keybound_crypto::{SignatureVerifier, StateSeal};
use serde_json::json;

/// Deterministic Ed25519 key pair from a fixed seed.
fn test_keypair() -> (SigningKey, [u8; 32]) {
    let seed: [u8; 32] = [
        9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let public = signing_key.verifying_key().to_bytes();
    (signing_key, public)
}

fn sign_b64(signing_key: &SigningKey, payload: &[u8]) -> String {
    BASE64.encode(signing_key.sign(payload).to_bytes())
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn from_bytes_valid_key() {
    let (_, pk) = test_keypair();
    assert!(SignatureVerifier::from_bytes(&pk).is_ok());
}

#[test]
fn from_base64_roundtrip() {
    let (sk, pk) = test_keypair();
    let encoded = BASE64.encode(pk);
    let verifier = SignatureVerifier::from_base64(&encoded).unwrap();

    let payload = b"hello";
    assert!(verifier.verify(payload, &sign_b64(&sk, payload)));
}

#[test]
fn from_base64_rejects_garbage() {
    assert!(SignatureVerifier::from_base64("not base64 !!!").is_err());
}

#[test]
fn from_base64_rejects_wrong_length() {
    let encoded = BASE64.encode([0u8; 16]);
    assert!(SignatureVerifier::from_base64(&encoded).is_err());
}

#[test]
fn from_pem_rejects_garbage() {
    assert!(SignatureVerifier::from_pem("-----BEGIN NONSENSE-----").is_err());
}

// ── Verification ─────────────────────────────────────────────────

#[test]
fn verify_matching_signature() {
    let (sk, pk) = test_keypair();
    let verifier = SignatureVerifier::from_bytes(&pk).unwrap();
    let payload = b"canonical payload bytes";
    assert!(verifier.verify(payload, &sign_b64(&sk, payload)));
}

#[test]
fn verify_rejects_tampered_payload() {
    let (sk, pk) = test_keypair();
    let verifier = SignatureVerifier::from_bytes(&pk).unwrap();
    let sig = sign_b64(&sk, b"original");
    assert!(!verifier.verify(b"tampered", &sig));
}

#[test]
fn verify_rejects_wrong_key() {
    let (sk, _) = test_keypair();
    let other = SigningKey::from_bytes(&[42u8; 32]);
    let verifier = SignatureVerifier::from_bytes(&other.verifying_key().to_bytes()).unwrap();
    let payload = b"payload";
    assert!(!verifier.verify(payload, &sign_b64(&sk, payload)));
}

#[test]
fn verify_malformed_base64_is_false_not_error() {
    let (_, pk) = test_keypair();
    let verifier = SignatureVerifier::from_bytes(&pk).unwrap();
    assert!(!verifier.verify(b"payload", "!!! not base64 !!!"));
}

#[test]
fn verify_wrong_length_signature_is_false() {
    let (_, pk) = test_keypair();
    let verifier = SignatureVerifier::from_bytes(&pk).unwrap();
    assert!(!verifier.verify(b"payload", &BASE64.encode([0u8; 10])));
}

#[test]
fn verify_canonical_document() {
    let (sk, pk) = test_keypair();
    let verifier = SignatureVerifier::from_bytes(&pk).unwrap();

    let doc = json!({"plan": "annual", "seat_count": 5});
    let payload = to_canonical_bytes(&doc).unwrap();
    let sig = sign_b64(&sk, &payload);

    // Re-parse with different key order; canonical bytes must still verify.
    let reordered: serde_json::Value =
        serde_json::from_str(r#"{"seat_count":5,"plan":"annual"}"#).unwrap();
    let payload2 = to_canonical_bytes(&reordered).unwrap();
    assert!(verifier.verify(&payload2, &sig));
}

// ── StateSeal ────────────────────────────────────────────────────

#[test]
fn seal_sign_verify_roundtrip() {
    let seal = StateSeal::generate();
    let payload = b"record bytes";
    let sig = seal.sign(payload);
    assert!(seal.verifier().verify(payload, &sig));
}

#[test]
fn seal_survives_seed_roundtrip() {
    let seal = StateSeal::generate();
    let payload = b"record bytes";
    let sig = seal.sign(payload);

    let restored = StateSeal::from_seed(&seal.seed());
    assert!(restored.verifier().verify(payload, &sig));
}

#[test]
fn different_seals_do_not_cross_verify() {
    let a = StateSeal::generate();
    let b = StateSeal::generate();
    let payload = b"record bytes";
    assert!(!b.verifier().verify(payload, &a.sign(payload)));
}

#[test]
fn seal_from_seed_slice_rejects_wrong_length() {
    assert!(StateSeal::from_seed_slice(&[1, 2, 3]).is_err());
}

#[test]
fn seal_debug_redacts_seed() {
    let seal = StateSeal::generate();
    assert!(!format!("{seal:?}").contains(&format!("{:?}", seal.seed())));
}
