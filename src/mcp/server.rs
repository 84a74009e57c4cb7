// ABOUTME: Centralized resource container and JSON-RPC request routing
// ABOUTME: One ServerResources instance owns every shared handle for the process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! Shared server state and the method router. Each inbound request is an
//! independent unit of work over the same [`ServerResources`]; the overflow
//! store is the only mutable state they share.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::constants::limits::DEFAULT_CACHE_MAX_ENTRIES;
use crate::garmin::GarminApi;
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::limits::SizeGuard;
use crate::mcp::protocol::ProtocolHandler;
use crate::overflow::OverflowStore;
use crate::tools::schema::ToolResponse;
use crate::tools::ToolRouter;

/// Centralized resource container for dependency injection
pub struct ServerResources {
    /// Garmin Connect client behind its trait seam
    pub api: Arc<dyn GarminApi>,
    /// Overflow store shared by the size guard and resource resolution
    pub overflow: Arc<OverflowStore>,
    /// Response cache for fetch-style tools
    pub cache: Arc<ResponseCache>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create resources around an API client and configuration
    #[must_use]
    pub fn new(api: Arc<dyn GarminApi>, config: ServerConfig) -> Self {
        Self {
            api,
            overflow: Arc::new(OverflowStore::new()),
            cache: Arc::new(ResponseCache::new(DEFAULT_CACHE_MAX_ENTRIES)),
            config: Arc::new(config),
        }
    }

    /// Size guard bound to this process's overflow store
    #[must_use]
    pub fn size_guard(&self) -> SizeGuard {
        SizeGuard::new(self.overflow.clone(), self.config.limits.clone())
    }

    /// Spawn the periodic overflow sweep. Hygiene only; `get` evicts lazily
    /// regardless.
    pub fn spawn_overflow_sweeper(&self) -> JoinHandle<()> {
        let store = self.overflow.clone();
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = store.sweep();
                if removed > 0 {
                    debug!(removed, "overflow sweep");
                }
            }
        })
    }
}

/// MCP request router
pub struct McpServer {
    resources: Arc<ServerResources>,
    router: ToolRouter,
}

impl McpServer {
    /// Create a server over shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        let router = ToolRouter::new(
            resources.api.clone(),
            resources.cache.clone(),
            resources.size_guard(),
        );
        Self { resources, router }
    }

    /// Route one request. Notifications return `None`; everything else gets
    /// exactly one response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        match request.method.as_str() {
            "initialize" => Some(ProtocolHandler::handle_initialize(&request)),
            "notifications/initialized" | "notifications/cancelled" => {
                debug!(method = %request.method, "notification received");
                None
            }
            "ping" => Some(ProtocolHandler::handle_ping(&request)),
            "tools/list" => Some(ProtocolHandler::handle_tools_list(&request)),
            "tools/call" => Some(self.handle_tools_call(request).await),
            "resources/list" => Some(ProtocolHandler::handle_resources_list(
                &request,
                &self.resources.overflow,
            )),
            "resources/read" => Some(ProtocolHandler::handle_resources_read(
                &request,
                &self.resources.overflow,
            )),
            _ if request.is_notification() => None,
            _ => Some(ProtocolHandler::handle_unknown_method(&request)),
        }
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let request_id = request.id.clone();

        let Some(params) = request.params else {
            return JsonRpcResponse::error(
                request_id,
                error_codes::INVALID_PARAMS,
                "Missing parameters",
            );
        };
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                request_id,
                error_codes::INVALID_PARAMS,
                "Missing tool name",
            );
        };
        if !self.router.knows(name) {
            return JsonRpcResponse::error(
                request_id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {name}"),
            );
        }

        let args: Map<String, Value> = params
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let response: ToolResponse = self.router.dispatch(name, args).await;
        match serde_json::to_value(&response) {
            Ok(result) => JsonRpcResponse::success(request_id, result),
            Err(e) => JsonRpcResponse::error(
                request_id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize tool response: {e}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::errors::{AppResult, GarminError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    struct NoDataApi;

    #[async_trait]
    impl GarminApi for NoDataApi {
        async fn activities_by_date(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> AppResult<Vec<Value>> {
            Ok(vec![])
        }
        async fn activity(&self, id: u64) -> AppResult<Value> {
            Err(GarminError::NotFound(format!("activity {id}")))
        }
        async fn activity_details(&self, id: u64) -> AppResult<Value> {
            Err(GarminError::NotFound(format!("activity {id}")))
        }
        async fn activity_splits(&self, id: u64) -> AppResult<Value> {
            Err(GarminError::NotFound(format!("activity {id}")))
        }
        async fn activity_weather(&self, id: u64) -> AppResult<Value> {
            Err(GarminError::NotFound(format!("activity {id}")))
        }
        async fn personal_records(&self) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn max_metrics(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn training_status(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(Value::Null)
        }
        async fn training_readiness(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn race_predictions(&self) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn resting_heart_rate(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!({}))
        }
        async fn heart_rate_zones(&self) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn sleep_data(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!({}))
        }
        async fn body_battery(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!([]))
        }
        async fn stress_data(&self, _date: NaiveDate) -> AppResult<Value> {
            Ok(json!([]))
        }
    }

    fn test_server() -> McpServer {
        let resources = Arc::new(ServerResources::new(
            Arc::new(NoDataApi),
            ServerConfig::default(),
        ));
        McpServer::new(resources)
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = test_server();
        let request: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(server.handle_request(request).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_errors() {
        let server = test_server();
        let request = JsonRpcRequest::new("bogus/method", None);
        let response = server.handle_request(request).await.unwrap();
        assert_eq!(
            response.error.unwrap().code,
            error_codes::METHOD_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_tools_call_error_is_payload_not_protocol_error() {
        let server = test_server();
        let request = JsonRpcRequest::new(
            "tools/call",
            Some(json!({
                "name": "get_activity_summary",
                "arguments": {"activity_id": 7}
            })),
        );
        let response = server.handle_request(request).await.unwrap();
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(
            result["structuredContent"]["error_type"],
            "GarminDataNotFoundError"
        );
    }
}
