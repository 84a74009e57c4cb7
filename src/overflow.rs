// ABOUTME: Time-expiring in-memory store for response fields too large to inline
// ABOUTME: Diverted payloads become addressable overflow:// resources until their TTL lapses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Overflow Store
//!
//! When a tool response exceeds the byte budget, its heavy fields are moved
//! here and replaced with `overflow://` URIs the client can read back via
//! `resources/read`. Entries self-expire; a miss on an expired or unknown
//! key is a normal outcome, not an error.
//!
//! All mutating access goes through one mutex. Expected load is
//! low-volume and interactive, so a single critical section beats any
//! sharding scheme for simplicity and makes the check-and-evict on `get`
//! trivially atomic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::OVERFLOW_URI_SCHEME;

/// Injectable time source so tests can drive expiry without sleeping
pub trait TimeSource: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Default wall-clock time source
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A single stored overflow payload
struct OverflowEntry {
    payload: Value,
    expires_at: Instant,
    namespace: String,
    field_name: String,
}

/// Snapshot of a live entry, for resource listings
#[derive(Debug, Clone)]
pub struct OverflowEntryInfo {
    /// Store key (the `overflow://` URI path component)
    pub key: String,
    /// Owning context, e.g. `activity:12345`
    pub namespace: String,
    /// Field the payload was diverted from
    pub field_name: String,
}

/// Keyed, TTL-bounded store for diverted response data.
///
/// Constructor-injected wherever it is needed; never a process global.
/// Entry lifecycle is Empty -> Stored -> (Read* | Expired) -> Gone, with
/// expired entries removed lazily on `get` or in bulk by `sweep`.
pub struct OverflowStore {
    entries: Mutex<HashMap<String, OverflowEntry>>,
    clock: Arc<dyn TimeSource>,
}

impl OverflowStore {
    /// Create a store backed by the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source (tests use a manual clock)
    #[must_use]
    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Store a diverted payload and return its key.
    ///
    /// Keys embed the owning namespace and field name for diagnostics plus
    /// a random suffix, so repeated diversions of the same field never
    /// collide and never overwrite each other.
    pub fn put(&self, namespace: &str, field_name: &str, payload: Value, ttl: Duration) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let key = format!("{namespace}_{field_name}_{}", &suffix[..8]);
        let expires_at = self.clock.now() + ttl;

        let mut entries = self.lock_entries();
        entries.insert(
            key.clone(),
            OverflowEntry {
                payload,
                expires_at,
                namespace: namespace.to_owned(),
                field_name: field_name.to_owned(),
            },
        );
        drop(entries);

        info!(key = %key, ttl_secs = ttl.as_secs(), "stored overflow data");
        key
    }

    /// Retrieve a payload by key.
    ///
    /// Returns `None` for unknown keys and for expired entries; an expired
    /// entry is evicted on the way out. The expiry check and eviction happen
    /// under the same lock as the lookup.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        let live = entries.get(key).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.payload.clone())
            } else {
                None
            }
        });
        if live.is_none() {
            if entries.remove(key).is_some() {
                info!(key = %key, "overflow data expired");
            } else {
                warn!(key = %key, "overflow data not found");
            }
        }
        live
    }

    /// Remove every expired entry; returns how many were evicted.
    ///
    /// Hygiene only: `get` already evicts lazily, so correctness never
    /// depends on the sweep running.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let removed = before - entries.len();
        drop(entries);

        if removed > 0 {
            debug!(removed, "swept expired overflow entries");
        }
        removed
    }

    /// Snapshot of currently live entries, for `resources/list`
    #[must_use]
    pub fn live_entries(&self) -> Vec<OverflowEntryInfo> {
        let now = self.clock.now();
        let entries = self.lock_entries();
        entries
            .iter()
            .filter(|(_, entry)| now < entry.expires_at)
            .map(|(key, entry)| OverflowEntryInfo {
                key: key.clone(),
                namespace: entry.namespace.clone(),
                field_name: entry.field_name.clone(),
            })
            .collect()
    }

    /// Number of entries currently held, expired or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, OverflowEntry>> {
        // A poisoned lock means a panic elsewhere; the map itself is still
        // structurally sound, so recover rather than propagate.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OverflowStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the addressable URI for a stored key
#[must_use]
pub fn resource_uri(key: &str) -> String {
    format!("{OVERFLOW_URI_SCHEME}://{key}")
}

/// Extract the store key from an `overflow://` URI, if it is one
#[must_use]
pub fn parse_resource_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(OVERFLOW_URI_SCHEME)
        .and_then(|rest| rest.strip_prefix("://"))
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_put_get_roundtrip() {
        let store = OverflowStore::new();
        let key = store.put(
            "activity:1",
            "raw_details",
            json!({"points": [1, 2, 3]}),
            Duration::from_secs(60),
        );
        assert_eq!(store.get(&key), Some(json!({"points": [1, 2, 3]})));
    }

    #[test]
    fn test_unknown_key_is_miss_not_error() {
        let store = OverflowStore::new();
        assert_eq!(store.get("nope"), None);
    }

    #[test]
    fn test_resource_uri_roundtrip() {
        let uri = resource_uri("activity:1_raw_details_ab12cd34");
        assert_eq!(
            parse_resource_uri(&uri),
            Some("activity:1_raw_details_ab12cd34")
        );
        assert_eq!(parse_resource_uri("file:///etc/passwd"), None);
        assert_eq!(parse_resource_uri("overflow://"), None);
    }
}
