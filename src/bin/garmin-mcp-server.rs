// ABOUTME: Binary entrypoint for the Garmin Connect MCP server
// ABOUTME: Initializes logging, authenticates, and serves MCP over stdio
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use garmin_mcp_server::config::ServerConfig;
use garmin_mcp_server::garmin::GarminClient;
use garmin_mcp_server::logging::{LogFormat, LoggingConfig};
use garmin_mcp_server::mcp::{McpServer, ServerResources, StdioTransport};

/// Garmin Connect MCP server
#[derive(Debug, Parser)]
#[command(name = "garmin-mcp-server", version, about)]
struct Cli {
    /// Log level directive (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: pretty, compact, or json (overrides LOG_FORMAT)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    match cli.log_format.as_deref() {
        Some("json") => logging.format = LogFormat::Json,
        Some("compact") => logging.format = LogFormat::Compact,
        Some("pretty") => logging.format = LogFormat::Pretty,
        Some(other) => anyhow::bail!("unknown log format: {other}"),
        None => {}
    }
    logging.init().context("failed to initialize logging")?;

    let config = ServerConfig::from_env();
    let client = GarminClient::new(&config);

    // Authenticate up front so a credential problem surfaces immediately
    // instead of on the first tool call.
    match client.login().await {
        Ok(()) => info!("Garmin Connect session established"),
        Err(e) => warn!(error = %e, "initial login failed; will retry on first request"),
    }

    let resources = Arc::new(ServerResources::new(Arc::new(client), config));
    let sweeper = resources.spawn_overflow_sweeper();

    let server = Arc::new(McpServer::new(resources));
    let transport = StdioTransport::new(server);
    let result = transport.run().await;

    sweeper.abort();
    result
}
