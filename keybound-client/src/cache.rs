//! Derived response cache.
//!
//! The SDK layers request/response wrappers (downloads, contract lookups)
//! above this core and caches their raw payloads here, keyed by license
//! key and endpoint. Resolution never reads this cache; its job is to let
//! `clear_license_state` purge everything derived from a key in one sweep.

use chrono::{DateTime, Utc};
use keybound_types::LicenseKey;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// An in-memory TTL cache of raw service responses per license key.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a response payload until `expires_at`.
    pub fn insert(
        &self,
        key: &LicenseKey,
        endpoint: &str,
        value: Value,
        expires_at: DateTime<Utc>,
    ) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry_key(key, endpoint), CacheEntry { value, expires_at });
    }

    /// Returns the cached payload if present and not expired at `now`.
    #[must_use]
    pub fn get(&self, key: &LicenseKey, endpoint: &str, now: DateTime<Utc>) -> Option<Value> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(&entry_key(key, endpoint))?;
        (now <= entry.expires_at).then(|| entry.value.clone())
    }

    /// Removes every entry derived from a license key.
    pub fn purge(&self, key: &LicenseKey) {
        let prefix = format!("{}:", key.storage_key());
        self.entries
            .lock()
            .unwrap()
            .retain(|k, _| !k.starts_with(&prefix));
    }
}

fn entry_key(key: &LicenseKey, endpoint: &str) -> String {
    format!("{}:{endpoint}", key.storage_key())
}
