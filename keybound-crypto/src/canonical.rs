//! Canonical JSON serialization.
//!
//! Signatures are only meaningful over a deterministic byte sequence.
//! Canonical form: object keys in lexicographic (byte) order at every
//! nesting level, no insignificant whitespace, strings escaped exactly as
//! serde_json escapes them. Two structurally equal documents always
//! canonicalize to identical bytes regardless of insertion order.

use crate::error::{CryptoError, CryptoResult};
use serde_json::Value;
use std::collections::BTreeMap;

/// Serializes a JSON value to its canonical byte form.
///
/// # Errors
///
/// Returns [`CryptoError::Canonical`] if string escaping fails, which only
/// happens on values that are not representable as JSON in the first place.
pub fn to_canonical_bytes(value: &Value) -> CryptoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    write_value(&mut out, value)?;
    Ok(out)
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> CryptoResult<()> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_string(out, s)?,
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // BTreeMap gives the lexicographic key order.
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            out.push(b'{');
            for (i, (key, item)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, key)?;
                out.push(b':');
                write_value(out, item)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(out: &mut Vec<u8>, s: &str) -> CryptoResult<()> {
    let escaped =
        serde_json::to_vec(s).map_err(|e| CryptoError::Canonical(e.to_string()))?;
    out.extend_from_slice(&escaped);
    Ok(())
}
