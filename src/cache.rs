// ABOUTME: TTL'd in-memory cache for tool responses with LRU bounding
// ABOUTME: Durations vary per data type; error payloads are never cached
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

//! Response caching for fetch-style tools. Applied by the dispatcher as an
//! explicit wrapper around handlers, keyed by tool name plus canonical
//! argument JSON. Each data type gets a duration matched to how fast the
//! underlying metric changes upstream (resting heart rate: minutes;
//! personal records: a day).

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::constants::{cache_durations, limits};
use crate::overflow::{SystemClock, TimeSource};

/// Cached response with its expiry
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Look up the cache duration for a data-type kind
#[must_use]
pub fn duration_for_kind(kind: &str) -> Duration {
    let hours = cache_durations::TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map_or(cache_durations::DEFAULT_HOURS, |(_, h)| *h);
    Duration::from_secs_f64(hours * 3600.0)
}

/// Build the cache key for a tool invocation. Arguments serialize with
/// sorted keys, so equal calls always map to the same entry.
#[must_use]
pub fn cache_key(tool_name: &str, args: &Map<String, Value>) -> String {
    let canonical =
        serde_json::to_string(&Value::Object(args.clone())).unwrap_or_else(|_| "{}".to_owned());
    format!("{tool_name}:{canonical}")
}

/// LRU-bounded TTL cache shared across concurrent tool calls
pub struct ResponseCache {
    store: RwLock<LruCache<String, CacheEntry>>,
    clock: Arc<dyn TimeSource>,
}

impl ResponseCache {
    /// Default capacity used when a configured bound is zero
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(limits::DEFAULT_CACHE_MAX_ENTRIES)
    {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a cache bounded to `max_entries`, backed by the system clock
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit time source
    #[must_use]
    pub fn with_clock(max_entries: usize, clock: Arc<dyn TimeSource>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: RwLock::new(LruCache::new(capacity)),
            clock,
        }
    }

    /// Fetch a live cached response; expired entries are evicted on the way
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut store = self.store.write().await;

        if let Some(entry) = store.get(key) {
            if now >= entry.expires_at {
                store.pop(key);
                return None;
            }
            debug!(key = %key, "cache hit");
            return Some(entry.value.clone());
        }
        None
    }

    /// Cache a successful response. Error payloads are skipped so a
    /// transient upstream failure does not stick around for the TTL.
    pub async fn put(&self, key: String, value: &Value, ttl: Duration) {
        if value.get("error").is_some() {
            return;
        }
        let entry = CacheEntry {
            value: value.clone(),
            expires_at: self.clock.now() + ttl,
        };
        self.store.write().await.push(key, entry);
    }

    /// Drop everything
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Count of valid (unexpired) and total entries, for diagnostics
    pub async fn stats(&self) -> (usize, usize) {
        let now = self.clock.now();
        let store = self.store.read().await;
        let valid = store
            .iter()
            .filter(|(_, entry)| now < entry.expires_at)
            .count();
        (valid, store.len())
    }
}
