// ABOUTME: MCP server implementation: protocol handlers, shared resources, stdio transport
// ABOUTME: Routes JSON-RPC methods to tools and overflow resource resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

/// Core protocol message handlers (initialize, ping, lists, resource reads)
pub mod protocol;
/// Shared resource container and request routing
pub mod server;
/// Stdio transport loop
pub mod stdio;

pub use server::{McpServer, ServerResources};
pub use stdio::StdioTransport;
