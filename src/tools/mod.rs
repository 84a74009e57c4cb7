// ABOUTME: Tool registry and dispatch pipeline: cache, handler, error absorption, size guard
// ABOUTME: The cross-cutting wrappers are explicit stages here, not annotations on handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Tool Dispatch
//!
//! Every `tools/call` flows through the same pipeline:
//!
//! 1. cache lookup (fetch-style tools only, keyed by tool + arguments)
//! 2. the handler itself, against the [`GarminApi`] seam
//! 3. error absorption: a classified failure becomes a structured payload,
//!    never a protocol error
//! 4. cache fill for successful results
//! 5. the size guard, which diverts oversized fields into the overflow store
//!
//! Handlers stay unaware of all five stages.

/// Fetch-and-shape tool handlers
pub mod handlers;
/// Tool schema definitions and response types
pub mod schema;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;

use self::handlers::ToolArgs;
use self::schema::{cache_kind, ToolResponse};
use crate::cache::{cache_key, duration_for_kind, ResponseCache};
use crate::errors::{AppResult, GarminError};
use crate::garmin::GarminApi;
use crate::limits::SizeGuard;

/// Shared pieces the dispatcher needs for every call
pub struct ToolRouter {
    api: Arc<dyn GarminApi>,
    cache: Arc<ResponseCache>,
    size_guard: SizeGuard,
}

impl ToolRouter {
    /// Create a router over the shared server resources
    #[must_use]
    pub fn new(api: Arc<dyn GarminApi>, cache: Arc<ResponseCache>, size_guard: SizeGuard) -> Self {
        Self {
            api,
            cache,
            size_guard,
        }
    }

    /// Execute a tool call end to end. Always produces a response; failures
    /// surface as structured error payloads with `isError` set.
    pub async fn dispatch(&self, name: &str, args: ToolArgs) -> ToolResponse {
        let started = Instant::now();

        let kind = cache_kind(name);
        let key = kind.map(|_| cache_key(name, &args));

        if let Some(key) = &key {
            if let Some(cached) = self.cache.get(key).await {
                let guarded = self.size_guard.apply(&namespace_for(name, &args), cached);
                return ToolResponse::from_value(guarded, false);
            }
        }

        let result = self.run_handler(name, &args).await;

        let (value, is_error) = match result {
            Ok(value) => (value, false),
            Err(e) => {
                tracing::error!(tool = name, error = %e, "tool call failed");
                (e.to_payload(), true)
            }
        };

        if !is_error {
            if let (Some(key), Some(kind)) = (key, kind) {
                self.cache.put(key, &value, duration_for_kind(kind)).await;
            }
        }

        let guarded = self.size_guard.apply(&namespace_for(name, &args), value);

        info!(
            tool = name,
            success = !is_error,
            duration_ms = started.elapsed().as_millis() as u64,
            "tool call"
        );
        ToolResponse::from_value(guarded, is_error)
    }

    /// Whether a tool with this name exists
    #[must_use]
    pub fn knows(&self, name: &str) -> bool {
        schema::get_tools().iter().any(|tool| tool.name == name)
    }

    async fn run_handler(&self, name: &str, args: &ToolArgs) -> AppResult<Value> {
        let api = self.api.as_ref();
        match name {
            "get_recent_running_activities" => {
                handlers::get_recent_running_activities(api, args).await
            }
            "get_running_trends" => handlers::get_running_trends(api, args).await,
            "get_activity_summary" => handlers::get_activity_summary(api, args).await,
            "get_activity_details" => handlers::get_activity_details(api, args).await,
            "get_personal_records" => handlers::get_personal_records(api, args).await,
            "get_vo2max" => handlers::get_vo2max(api, args).await,
            "get_training_status" => handlers::get_training_status(api, args).await,
            "get_training_readiness" => handlers::get_training_readiness(api, args).await,
            "get_heart_rate_metrics" => handlers::get_heart_rate_metrics(api, args).await,
            "get_sleep_analysis" => handlers::get_sleep_analysis(api, args).await,
            "get_body_battery" => handlers::get_body_battery(api, args).await,
            "get_stress_levels" => handlers::get_stress_levels(api, args).await,
            "get_race_predictions" => handlers::get_race_predictions(api, args).await,
            "calculate_training_paces" => handlers::calculate_training_paces(api, args).await,
            "calculate_vdot_zones" => handlers::calculate_vdot_zones(api, args).await,
            other => Err(GarminError::InvalidParams(format!("Unknown tool: {other}"))),
        }
    }
}

/// Overflow namespace for a call: the activity when one is named, the tool
/// otherwise.
fn namespace_for(name: &str, args: &ToolArgs) -> String {
    args.get("activity_id")
        .and_then(Value::as_u64)
        .map_or_else(|| name.to_owned(), |id| format!("activity:{id}"))
}
