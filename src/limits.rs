// ABOUTME: Response byte-budget enforcement via field classification and overflow diversion
// ABOUTME: SizeGuard wraps any tool result; the splitter moves heavy fields into the overflow store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Response Size Management
//!
//! Tool responses are capped at a hard byte budget. The [`SizeGuard`]
//! measures each result after the handler runs; responses under budget pass
//! through untouched, oversized ones go through [`split_large_response`],
//! which diverts heavy fields into the [`OverflowStore`] and rewrites the
//! response to reference them by `overflow://` URI.
//!
//! Fields qualify for diversion only when their name matches a heavy-field
//! pattern AND their serialized size exceeds the per-field threshold; the
//! name check runs first so only name-matched fields pay for serialization.
//! One pass, no recursion: if the oversized bytes live in fields the
//! heuristics do not cover, the response is returned still over budget.
//! Slightly-too-large data beats hidden data.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::constants::{limits, LARGE_FIELD_PATTERNS};
use crate::overflow::{resource_uri, OverflowStore};

/// Byte-budget configuration for the guard and splitter
#[derive(Debug, Clone)]
pub struct ResponseLimits {
    /// Maximum acceptable serialized response size
    pub max_response_bytes: usize,
    /// Minimum serialized size for a field to qualify for diversion
    pub field_threshold_bytes: usize,
    /// Time-to-live for diverted payloads
    pub overflow_ttl: Duration,
}

impl Default for ResponseLimits {
    fn default() -> Self {
        Self {
            max_response_bytes: limits::DEFAULT_MAX_RESPONSE_BYTES,
            field_threshold_bytes: limits::DEFAULT_FIELD_THRESHOLD_BYTES,
            overflow_ttl: Duration::from_secs(limits::DEFAULT_OVERFLOW_TTL_SECS),
        }
    }
}

/// Serialized size of a value in its transport encoding (UTF-8 JSON bytes).
///
/// Never fails: input that cannot serialize reports 0 with a warning so the
/// guard can still make a decision.
#[must_use]
pub fn estimate_json_size(value: &Value) -> usize {
    match serde_json::to_vec(value) {
        Ok(bytes) => bytes.len(),
        Err(e) => {
            warn!(error = %e, "failed to estimate JSON size");
            0
        }
    }
}

/// Whether a field qualifies for diversion: name pattern first (cheap),
/// then the size threshold (pays for serialization).
#[must_use]
pub fn is_large_field(name: &str, value: &Value, threshold_bytes: usize) -> bool {
    if value.is_null() {
        return false;
    }
    let lowered = name.to_lowercase();
    if !LARGE_FIELD_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        return false;
    }
    estimate_json_size(value) > threshold_bytes
}

/// Divert heavy fields of an oversized response into the overflow store.
///
/// No-op when the response is already under budget, so it can be called
/// unconditionally. Each diverted field is replaced by two synthetic keys:
/// `{field}_resource` (the `overflow://` URI) and `{field}_note` (a pointer
/// for the reader). When anything moved, an `_overflow_info` field records
/// which names moved and the before/after sizes.
///
/// The output always estimates strictly smaller than the input when at
/// least one field is diverted; there is no guarantee it lands under
/// `max_response_bytes`.
#[must_use]
pub fn split_large_response(
    response: Map<String, Value>,
    context: &str,
    store: &OverflowStore,
    limits: &ResponseLimits,
) -> Map<String, Value> {
    let original_size = estimate_json_size(&Value::Object(response.clone()));
    if original_size <= limits.max_response_bytes {
        return response;
    }

    info!(
        context = %context,
        size = original_size,
        max = limits.max_response_bytes,
        "response exceeds limit, splitting"
    );

    let mut result = Map::new();
    let mut fields_moved: Vec<String> = Vec::new();

    for (key, value) in response {
        if is_large_field(&key, &value, limits.field_threshold_bytes) {
            let store_key = store.put(context, &key, value, limits.overflow_ttl);
            let uri = resource_uri(&store_key);
            result.insert(format!("{key}_resource"), json!(uri));
            result.insert(
                format!("{key}_note"),
                json!(format!(
                    "Data moved to resource due to size. Use {uri} to access."
                )),
            );
            fields_moved.push(key);
        } else {
            result.insert(key, value);
        }
    }

    if !fields_moved.is_empty() {
        let reduced_size = estimate_json_size(&Value::Object(result.clone()));
        result.insert(
            "_overflow_info".to_owned(),
            json!({
                "fields_moved": fields_moved,
                "original_size_bytes": original_size,
                "reduced_size_bytes": reduced_size,
            }),
        );
    }

    result
}

/// Policy wrapper measuring every tool result against the byte budget.
///
/// Stateless apart from the shared store handle; concurrent applications
/// run independently. Never raises: the worst case is handing back the
/// original, still-oversized response.
#[derive(Clone)]
pub struct SizeGuard {
    store: Arc<OverflowStore>,
    limits: ResponseLimits,
}

impl SizeGuard {
    /// Create a guard sharing the given overflow store
    #[must_use]
    pub fn new(store: Arc<OverflowStore>, limits: ResponseLimits) -> Self {
        Self { store, limits }
    }

    /// The configured limits
    #[must_use]
    pub const fn limits(&self) -> &ResponseLimits {
        &self.limits
    }

    /// Measure a finished result and divert heavy fields if it is over
    /// budget. `context` namespaces any diverted data, e.g. `activity:123`.
    #[must_use]
    pub fn apply(&self, context: &str, result: Value) -> Value {
        let size = estimate_json_size(&result);
        if size <= self.limits.max_response_bytes {
            return result;
        }

        match result {
            Value::Object(map) => {
                let reduced = split_large_response(map, context, &self.store, &self.limits);
                let final_size = estimate_json_size(&Value::Object(reduced.clone()));
                if final_size > self.limits.max_response_bytes {
                    warn!(
                        context = %context,
                        size = final_size,
                        max = self.limits.max_response_bytes,
                        "response still over budget after diversion"
                    );
                } else {
                    info!(context = %context, before = size, after = final_size, "response reduced");
                }
                Value::Object(reduced)
            }
            other => {
                // Non-object results have no fields to divert; returned as-is.
                warn!(context = %context, size, "oversized non-object response returned unmodified");
                other
            }
        }
    }
}
