// ABOUTME: MCP protocol message handlers for core protocol operations
// ABOUTME: Handles initialize, ping, tools/list, and overflow resource resolution
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::constants::{MCP_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::overflow::{parse_resource_uri, resource_uri, OverflowStore};
use crate::tools::schema::get_tools;

/// Server information advertised during initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Initialize response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: Value,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

impl InitializeResponse {
    /// Response advertising this server's tools and resources capabilities
    #[must_use]
    pub fn current() -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION.to_owned(),
            capabilities: json!({
                "tools": {},
                "resources": {},
            }),
            server_info: ServerInfo {
                name: SERVER_NAME.to_owned(),
                version: SERVER_VERSION.to_owned(),
            },
        }
    }
}

/// MCP protocol handlers
pub struct ProtocolHandler;

/// Default ID for responses to malformed requests that carried none
fn default_request_id() -> Value {
    Value::Number(serde_json::Number::from(0))
}

impl ProtocolHandler {
    /// Handle initialize request
    #[must_use]
    pub fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        match serde_json::to_value(InitializeResponse::current()) {
            Ok(result) => JsonRpcResponse::success(Some(request_id), result),
            Err(_) => JsonRpcResponse::error(
                Some(request_id),
                error_codes::INTERNAL_ERROR,
                "Internal error",
            ),
        }
    }

    /// Handle ping request
    #[must_use]
    pub fn handle_ping(request: &JsonRpcRequest) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        JsonRpcResponse::success(Some(request_id), json!({}))
    }

    /// Handle tools list request
    #[must_use]
    pub fn handle_tools_list(request: &JsonRpcRequest) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        JsonRpcResponse::success(Some(request_id), json!({ "tools": get_tools() }))
    }

    /// Handle resources list request: every live overflow entry is an
    /// addressable resource.
    #[must_use]
    pub fn handle_resources_list(
        request: &JsonRpcRequest,
        store: &OverflowStore,
    ) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);

        let resources: Vec<Value> = store
            .live_entries()
            .into_iter()
            .map(|entry| {
                json!({
                    "uri": resource_uri(&entry.key),
                    "name": format!("{} ({})", entry.field_name, entry.namespace),
                    "description": "Overflow data diverted from a tool response due to size",
                    "mimeType": "application/json",
                })
            })
            .collect();

        JsonRpcResponse::success(Some(request_id), json!({ "resources": resources }))
    }

    /// Handle resources read request for `overflow://` URIs.
    ///
    /// A missing or expired entry is a normal outcome: the response is a
    /// structured "gone" payload telling the caller to re-run the original
    /// request, not a protocol error.
    #[must_use]
    pub fn handle_resources_read(
        request: &JsonRpcRequest,
        store: &OverflowStore,
    ) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);

        let Some(uri) = request
            .params
            .as_ref()
            .and_then(|params| params.get("uri"))
            .and_then(Value::as_str)
        else {
            return JsonRpcResponse::error(
                Some(request_id),
                error_codes::INVALID_PARAMS,
                "Missing uri parameter",
            );
        };

        let Some(key) = parse_resource_uri(uri) else {
            return JsonRpcResponse::error(
                Some(request_id),
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown resource URI: {uri}"),
            );
        };

        let payload = store.get(key).unwrap_or_else(|| {
            json!({
                "error": "Overflow data not found or expired",
                "note": "Re-run the original request to regenerate this data",
                "uri": uri,
            })
        });

        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_owned());
        JsonRpcResponse::success(
            Some(request_id),
            json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text,
                }]
            }),
        )
    }

    /// Handle unknown method request
    #[must_use]
    pub fn handle_unknown_method(request: &JsonRpcRequest) -> JsonRpcResponse {
        let request_id = request.id.clone().unwrap_or_else(default_request_id);
        JsonRpcResponse::error(
            Some(request_id),
            error_codes::METHOD_NOT_FOUND,
            format!("Unknown method: {}", request.method),
        )
    }
}
