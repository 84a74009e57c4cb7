// ABOUTME: Stdio transport: newline-delimited JSON-RPC over stdin/stdout
// ABOUTME: stdout carries only protocol frames; all logging goes to stderr
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::mcp::server::McpServer;

/// Stdio transport loop
pub struct StdioTransport {
    server: Arc<McpServer>,
}

impl StdioTransport {
    /// Create a transport over a server
    #[must_use]
    pub fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }

    /// Serve requests until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error when reading stdin or writing stdout fails
    pub async fn run(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        info!("stdio transport ready");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => {
                    debug!(method = %request.method, "request received");
                    self.server.handle_request(request).await
                }
                Err(e) => {
                    warn!(error = %e, "unparseable request line");
                    Some(JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        "Parse error",
                    ))
                }
            };

            if let Some(response) = response {
                let mut frame = serde_json::to_vec(&response)?;
                frame.push(b'\n');
                stdout.write_all(&frame).await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }
}
