// ABOUTME: Tests for the overflow store: TTL expiry, key isolation, sweep hygiene
// ABOUTME: Uses a manual clock so expiry is driven deterministically, never by sleeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use garmin_mcp_server::overflow::{resource_uri, OverflowStore, TimeSource};

/// Test clock advanced by hand
struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

#[test]
fn test_entry_readable_until_ttl_then_gone() {
    let clock = ManualClock::new();
    let store = OverflowStore::with_clock(clock.clone());

    let key = store.put(
        "activity:1",
        "raw_details",
        json!({"laps": 12}),
        Duration::from_secs(1),
    );

    assert_eq!(store.get(&key), Some(json!({"laps": 12})));

    clock.advance(Duration::from_secs(1));
    assert_eq!(store.get(&key), None);

    // The expired entry was evicted by the read, not merely hidden.
    assert!(store.is_empty());
}

#[test]
fn test_same_namespace_and_field_get_distinct_keys() {
    let store = OverflowStore::new();

    let first = store.put(
        "activity:1",
        "raw_details",
        json!("first payload"),
        Duration::from_secs(60),
    );
    let second = store.put(
        "activity:1",
        "raw_details",
        json!("second payload"),
        Duration::from_secs(60),
    );

    assert_ne!(first, second);
    assert_eq!(store.get(&first), Some(json!("first payload")));
    assert_eq!(store.get(&second), Some(json!("second payload")));
}

#[test]
fn test_sweep_removes_only_expired() {
    let clock = ManualClock::new();
    let store = OverflowStore::with_clock(clock.clone());

    let short = store.put("ns", "raw_a", json!(1), Duration::from_secs(10));
    let long = store.put("ns", "raw_b", json!(2), Duration::from_secs(100));

    clock.advance(Duration::from_secs(50));
    assert_eq!(store.sweep(), 1);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&short), None);
    assert_eq!(store.get(&long), Some(json!(2)));

    // Sweeping again with nothing expired is a no-op.
    assert_eq!(store.sweep(), 0);
}

#[test]
fn test_live_entries_exclude_expired() {
    let clock = ManualClock::new();
    let store = OverflowStore::with_clock(clock.clone());

    store.put("activity:1", "raw_details", json!(1), Duration::from_secs(10));
    store.put("activity:2", "gps_track", json!(2), Duration::from_secs(100));

    clock.advance(Duration::from_secs(20));
    let live = store.live_entries();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].namespace, "activity:2");
    assert_eq!(live[0].field_name, "gps_track");
    assert!(resource_uri(&live[0].key).starts_with("overflow://"));
}

#[test]
fn test_concurrent_puts_never_collide() {
    let store = Arc::new(OverflowStore::new());
    let mut handles = Vec::new();

    for thread_id in 0..8 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            (0..50)
                .map(|i| {
                    store.put(
                        "activity:1",
                        "raw_details",
                        json!({"thread": thread_id, "i": i}),
                        Duration::from_secs(60),
                    )
                })
                .collect::<Vec<_>>()
        }));
    }

    let mut all_keys: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = all_keys.len();
    all_keys.sort();
    all_keys.dedup();

    assert_eq!(all_keys.len(), total);
    assert_eq!(store.len(), total);
}
