// ABOUTME: Opaque cursor codec and uniform pagination envelope for listing tools
// ABOUTME: Cursors round-trip a small scalar state map through URL-safe base64
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Cursor Pagination
//!
//! Listing tools slice their results and hand back a resumable cursor: a
//! base64url encoding (no padding) of a small JSON object such as
//! `{"offset": 20, "days_back": 30}`. The token is opaque to everything
//! except this module. A malformed or foreign token decodes to `None` and
//! callers restart from the first page; decoding never fails loudly.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{json, Map, Value};
use tracing::warn;

/// Scalar state map carried by a cursor
pub type CursorState = Map<String, Value>;

/// Encode pagination state into an opaque URL-safe token.
///
/// serde_json keeps object keys sorted, so equal states always produce
/// equal tokens. Total for any scalar map; a serialization failure (not
/// reachable for `Value` input) degrades to an empty token.
#[must_use]
pub fn encode_cursor(state: &CursorState) -> String {
    match serde_json::to_vec(&Value::Object(state.clone())) {
        Ok(bytes) => base64::Engine::encode(&URL_SAFE_NO_PAD, bytes),
        Err(e) => {
            warn!(error = %e, "failed to encode cursor");
            String::new()
        }
    }
}

/// Decode an opaque cursor back into its state map.
///
/// Any structural failure (bad base64, truncated input, non-object JSON)
/// yields `None`, which callers treat as "no cursor".
#[must_use]
pub fn decode_cursor(token: &str) -> Option<CursorState> {
    if token.is_empty() {
        return None;
    }

    // Tolerate tokens that arrive with padding re-attached in transit.
    let trimmed = token.trim_end_matches('=');
    let bytes = base64::Engine::decode(&URL_SAFE_NO_PAD, trimmed).ok()?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(state)) => Some(state),
        _ => None,
    }
}

/// Read an integer offset out of a decoded cursor state, defaulting to 0
#[must_use]
pub fn cursor_offset(state: &CursorState) -> usize {
    state
        .get("offset")
        .and_then(Value::as_u64)
        .map_or(0, |n| n as usize)
}

/// Assemble the uniform envelope every paginated tool returns.
///
/// `has_more` defaults to the fill heuristic: the page is assumed to have
/// more after it iff it came back exactly full. When the true total is an
/// exact multiple of the page size this reports one extra (empty) page;
/// that is a known property of the heuristic, kept deliberately. Callers
/// that do know the real answer pass `Some(..)` to override.
///
/// The next cursor is attached only when there is more AND the caller
/// supplied a next state to encode.
#[must_use]
pub fn build_page(
    items: Vec<Value>,
    next_state: Option<CursorState>,
    page_size: usize,
    has_more: Option<bool>,
) -> Map<String, Value> {
    let has_more = has_more.unwrap_or(items.len() == page_size);

    let mut pagination = Map::new();
    pagination.insert("returned".to_owned(), json!(items.len()));
    pagination.insert("hasMore".to_owned(), json!(has_more));
    if has_more {
        if let Some(state) = next_state {
            pagination.insert("nextCursor".to_owned(), json!(encode_cursor(&state)));
        }
    }

    let mut envelope = Map::new();
    envelope.insert("items".to_owned(), Value::Array(items));
    envelope.insert("pagination".to_owned(), Value::Object(pagination));
    envelope
}
