mod common;

use common::{make_offline_doc, other_keypair, test_keypair, ts};
use keybound_license::{validate_offline, LicenseError, OfflineLicenseData, OfflineOptions};
use serde_json::json;

const NOW: i64 = 1_700_000_000;

fn sample_license() -> serde_json::Value {
    json!({
        "key": "ABCD-1234",
        "expires_at": "2099-12-31T23:59:59Z",
        "capabilities": ["updates", "downloads"],
    })
}

// ── Round trips ──────────────────────────────────────────────────

#[test]
fn valid_document_round_trip() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, sample_license());

    let result = validate_offline(
        &OfflineLicenseData::from(doc.to_string()),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();

    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.license["key"], "ABCD-1234");
}

#[test]
fn accepts_decoded_value_input() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, sample_license());

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(result.valid);
}

#[test]
fn wrong_key_fails_but_echoes_license() {
    let (sk, _) = test_keypair();
    let (_, wrong_verifier) = other_keypair();
    let doc = make_offline_doc(&sk, sample_license());

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &wrong_verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();

    assert!(!result.valid);
    assert!(!result.errors.is_empty());
    assert_eq!(result.license["key"], "ABCD-1234");
}

#[test]
fn mutated_license_fails_verification() {
    let (sk, verifier) = test_keypair();
    let mut doc = make_offline_doc(&sk, sample_license());
    doc["license"]["capabilities"] = json!(["updates", "downloads", "admin"]);

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();

    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("signature")));
}

// ── Structural misuse ────────────────────────────────────────────

#[test]
fn malformed_json_is_a_validation_error() {
    let (_, verifier) = test_keypair();
    let result = validate_offline(
        &OfflineLicenseData::from("{not json"),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    );
    assert!(matches!(result, Err(LicenseError::Validation(_))));
}

#[test]
fn missing_license_object_is_a_validation_error() {
    let (_, verifier) = test_keypair();
    let doc = json!({ "signature": "c2ln" });
    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    );
    assert!(matches!(result, Err(LicenseError::Validation(_))));
}

#[test]
fn missing_signature_is_a_validation_error() {
    let (_, verifier) = test_keypair();
    let doc = json!({ "license": sample_license() });
    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    );
    assert!(matches!(result, Err(LicenseError::Validation(_))));
}

#[test]
fn non_object_document_is_a_validation_error() {
    let (_, verifier) = test_keypair();
    let result = validate_offline(
        &OfflineLicenseData::from(json!([1, 2, 3])),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    );
    assert!(matches!(result, Err(LicenseError::Validation(_))));
}

// ── Expiry ───────────────────────────────────────────────────────

#[test]
fn expiry_within_tolerance_accepted() {
    let (sk, verifier) = test_keypair();
    // Expired 12 hours ago: inside the 24 h skew tolerance.
    let expires = ts(NOW - 12 * 60 * 60);
    let doc = make_offline_doc(
        &sk,
        json!({ "key": "K", "expires_at": expires.to_rfc3339() }),
    );

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(result.valid, "errors: {:?}", result.errors);
}

#[test]
fn expiry_beyond_tolerance_rejected() {
    let (sk, verifier) = test_keypair();
    // Expired 25 hours ago: past the tolerance.
    let expires = ts(NOW - 25 * 60 * 60);
    let doc = make_offline_doc(
        &sk,
        json!({ "key": "K", "expires_at": expires.to_rfc3339() }),
    );

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("expired")));
}

#[test]
fn epoch_seconds_expiry_accepted() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, json!({ "key": "K", "expires_at": NOW + 1000 }));

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(result.valid);
}

#[test]
fn unparseable_expiry_accumulates_error() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, json!({ "key": "K", "expires_at": "someday" }));

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("expires_at")));
}

#[test]
fn no_expiry_means_perpetual() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, json!({ "key": "K" }));

    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(result.valid);
}

// ── Hardware binding ─────────────────────────────────────────────

#[test]
fn hardware_mismatch_rejected() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, json!({ "key": "K", "hardware_id": "machine-a" }));

    let options = OfflineOptions {
        hardware_id: Some("machine-b".to_string()),
    };
    let result =
        validate_offline(&OfflineLicenseData::from(doc), &verifier, ts(NOW), &options).unwrap();
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("hardware")));
}

#[test]
fn hardware_match_accepted() {
    let (sk, verifier) = test_keypair();
    let doc = make_offline_doc(&sk, json!({ "key": "K", "hardware_id": "machine-a" }));

    let options = OfflineOptions {
        hardware_id: Some("machine-a".to_string()),
    };
    let result =
        validate_offline(&OfflineLicenseData::from(doc), &verifier, ts(NOW), &options).unwrap();
    assert!(result.valid);
}

#[test]
fn hardware_check_skipped_when_either_side_absent() {
    let (sk, verifier) = test_keypair();

    // License embeds an ID, caller supplies none.
    let doc = make_offline_doc(&sk, json!({ "key": "K", "hardware_id": "machine-a" }));
    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &verifier,
        ts(NOW),
        &OfflineOptions::default(),
    )
    .unwrap();
    assert!(result.valid);

    // Caller supplies an ID, license embeds none.
    let doc = make_offline_doc(&sk, json!({ "key": "K" }));
    let options = OfflineOptions {
        hardware_id: Some("machine-b".to_string()),
    };
    let result =
        validate_offline(&OfflineLicenseData::from(doc), &verifier, ts(NOW), &options).unwrap();
    assert!(result.valid);
}

// ── Multiple errors accumulate ───────────────────────────────────

#[test]
fn errors_accumulate() {
    let (sk, _) = test_keypair();
    let (_, wrong_verifier) = other_keypair();
    let expires = ts(NOW - 48 * 60 * 60);
    let doc = make_offline_doc(
        &sk,
        json!({
            "key": "K",
            "expires_at": expires.to_rfc3339(),
            "hardware_id": "machine-a",
        }),
    );

    let options = OfflineOptions {
        hardware_id: Some("machine-b".to_string()),
    };
    let result = validate_offline(
        &OfflineLicenseData::from(doc),
        &wrong_verifier,
        ts(NOW),
        &options,
    )
    .unwrap();

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 3);
}
