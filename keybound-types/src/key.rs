//! Normalized license keys and deterministic storage-key derivation.
//!
//! License keys arrive from user input (pasted, read from config files) and
//! routinely carry surrounding whitespace. All components operate on the
//! normalized form so that the same key always maps to the same stored
//! record. The raw key never appears in logs or on disk; storage keys are a
//! SHA-256 digest of the normalized key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from license key normalization.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key is empty after trimming.
    #[error("license key is empty")]
    Empty,
}

/// A normalized license key.
///
/// Construction trims surrounding whitespace and rejects empty input.
/// `Debug` and `Display` render a redacted form; use [`LicenseKey::as_str`]
/// when the raw key is genuinely needed (e.g. in a request body).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Normalizes a raw key string.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Empty`] if the key is empty after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, KeyError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the normalized key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the deterministic storage key for this license key.
    ///
    /// SHA-256 over the case-folded normalized key, hex-encoded. Two
    /// inputs that differ only in casing or surrounding whitespace derive
    /// the same storage key, and the raw key itself never reaches the
    /// storage medium.
    #[must_use]
    pub fn storage_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.to_lowercase().as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Returns a redacted rendering safe for logs: the first four
    /// characters followed by an ellipsis.
    #[must_use]
    pub fn redacted(&self) -> String {
        let head: String = self.0.chars().take(4).collect();
        format!("{head}\u{2026}")
    }
}

impl std::fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LicenseKey").field(&self.redacted()).finish()
    }
}

impl std::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl Serialize for LicenseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LicenseKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for LicenseKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
