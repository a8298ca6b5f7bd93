//! Standalone offline license file verification.
//!
//! An offline license file is a JSON document with a `license` object and a
//! detached `signature` over the canonical form of everything else:
//!
//! ```json
//! {
//!   "license": {
//!     "key": "ABCD-1234",
//!     "expires_at": "2027-01-01T00:00:00Z",
//!     "capabilities": ["updates", "downloads"],
//!     "hardware_id": "..."
//!   },
//!   "signature": "base64 Ed25519 signature"
//! }
//! ```
//!
//! Verification needs no network and no cache: the document and a public
//! key are the whole input. Structural misuse (malformed JSON, missing
//! fields) errors; every other failed check (signature mismatch, expiry,
//! hardware binding) accumulates into the returned result so a fully
//! disconnected caller always gets a structured answer.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Duration, Utc};
use keybound_crypto::canonical::to_canonical_bytes;
use keybound_crypto::SignatureVerifier;
use serde::Serialize;
use serde_json::Value;

/// Clock-skew tolerance on the expiry check: an `expires_at` up to 24 hours
/// in the past is still accepted.
pub const EXPIRY_SKEW_TOLERANCE_SECS: i64 = 24 * 60 * 60;

/// Offline license input: a JSON string or an already-decoded document.
#[derive(Debug, Clone)]
pub enum OfflineLicenseData {
    /// Raw JSON text, parsed during validation.
    Json(String),
    /// An already-decoded document.
    Value(Value),
}

impl From<&str> for OfflineLicenseData {
    fn from(json: &str) -> Self {
        Self::Json(json.to_string())
    }
}

impl From<String> for OfflineLicenseData {
    fn from(json: String) -> Self {
        Self::Json(json)
    }
}

impl From<Value> for OfflineLicenseData {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Per-call options for offline validation.
#[derive(Debug, Clone, Default)]
pub struct OfflineOptions {
    /// Hardware identifier to check against the license's embedded
    /// `hardware_id`, when the license carries one.
    pub hardware_id: Option<String>,
}

/// The structured outcome of offline validation.
///
/// `license` echoes the parsed license object even when validation failed,
/// so callers can display what the file claims.
#[derive(Debug, Clone, Serialize)]
pub struct OfflineValidation {
    /// True iff no errors accumulated.
    pub valid: bool,
    /// The parsed `license` object.
    pub license: Value,
    /// Every check that failed, in check order.
    pub errors: Vec<String>,
}

/// Verifies an offline license document against a public key at `now`.
///
/// # Errors
///
/// Returns [`LicenseError::Validation`] for structural misuse only:
/// malformed JSON, a non-object document, or a missing `license` object or
/// `signature` string. Verification failures never error; they accumulate
/// in the returned [`OfflineValidation`].
pub fn validate_offline(
    data: &OfflineLicenseData,
    verifier: &SignatureVerifier,
    now: DateTime<Utc>,
    options: &OfflineOptions,
) -> LicenseResult<OfflineValidation> {
    let document: Value = match data {
        OfflineLicenseData::Json(text) => serde_json::from_str(text)
            .map_err(|e| LicenseError::Validation(format!("not valid JSON: {e}")))?,
        OfflineLicenseData::Value(value) => value.clone(),
    };

    let Some(object) = document.as_object() else {
        return Err(LicenseError::Validation(
            "document must be a JSON object".to_string(),
        ));
    };

    let license = object
        .get("license")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| LicenseError::Validation("missing `license` object".to_string()))?;

    let Some(signature) = object.get("signature").and_then(Value::as_str) else {
        return Err(LicenseError::Validation(
            "missing `signature` field".to_string(),
        ));
    };
    let signature = signature.to_string();

    let mut errors = Vec::new();

    // Signature covers the canonical document with the signature removed.
    let mut unsigned = document.clone();
    if let Some(obj) = unsigned.as_object_mut() {
        obj.remove("signature");
    }
    let payload = to_canonical_bytes(&unsigned)?;
    if !verifier.verify(&payload, &signature) {
        errors.push("signature verification failed".to_string());
    }

    check_expiry(&license, now, &mut errors);
    check_hardware_binding(&license, options, &mut errors);

    Ok(OfflineValidation {
        valid: errors.is_empty(),
        license,
        errors,
    })
}

/// Expiry check with the fixed clock-skew tolerance.
///
/// Accepts `expires_at` as RFC 3339 text or epoch seconds; a license with
/// no `expires_at` never expires.
fn check_expiry(license: &Value, now: DateTime<Utc>, errors: &mut Vec<String>) {
    let Some(raw) = license.get("expires_at") else {
        return;
    };

    let expires_at = match raw {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    };

    let Some(expires_at) = expires_at else {
        errors.push(format!("unparseable expires_at: {raw}"));
        return;
    };

    let tolerance = Duration::seconds(EXPIRY_SKEW_TOLERANCE_SECS);
    if now > expires_at + tolerance {
        errors.push(format!("license expired on {}", expires_at.to_rfc3339()));
    }
}

/// Hardware binding check: only enforced when both sides supply an ID.
fn check_hardware_binding(license: &Value, options: &OfflineOptions, errors: &mut Vec<String>) {
    let embedded = license.get("hardware_id").and_then(Value::as_str);
    if let (Some(embedded), Some(local)) = (embedded, options.hardware_id.as_deref()) {
        if embedded != local {
            errors.push("hardware identifier does not match this machine".to_string());
        }
    }
}
