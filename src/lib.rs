// ABOUTME: Main library entry point for the Garmin Connect MCP server
// ABOUTME: Exposes training data and analytics to AI assistants over MCP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

#![deny(unsafe_code)]

//! # Garmin Connect MCP Server
//!
//! A Model Context Protocol (MCP) server exposing a Garmin Connect
//! account's fitness data and derived training analytics to AI assistants
//! over a stdio transport.
//!
//! ## Features
//!
//! - **Training data tools**: activities, sleep, heart rate, stress, body
//!   battery, training status and readiness, race predictions
//! - **Training analytics**: VDOT estimation, training paces, monthly trends
//! - **Response size management**: oversized payloads are diverted into a
//!   time-limited overflow store and served as `overflow://` resources
//! - **Cursor pagination**: listing tools hand back opaque resumable cursors
//!
//! ## Architecture
//!
//! - **garmin**: the Garmin Connect client behind the `GarminApi` trait seam
//! - **tools**: per-metric fetch-and-shape handlers and the dispatch pipeline
//! - **overflow / pagination / limits**: the response-size and pagination core
//! - **mcp**: protocol handlers, shared resources, stdio transport

/// Pure training-science functions (pace math, VDOT, zones)
pub mod analytics;

/// TTL'd response cache for fetch-style tools
pub mod cache;

/// Environment-driven server configuration
pub mod config;

/// Application constants and configuration defaults
pub mod constants;

/// Typed error taxonomy for Garmin Connect failures
pub mod errors;

/// Garmin Connect API client and trait seam
pub mod garmin;

/// JSON-RPC 2.0 message types
pub mod jsonrpc;

/// Response byte-budget enforcement and overflow diversion
pub mod limits;

/// Structured logging setup
pub mod logging;

/// MCP server: protocol handlers, resources, stdio transport
pub mod mcp;

/// Time-expiring store for diverted response data
pub mod overflow;

/// Cursor codec and pagination envelope
pub mod pagination;

/// Tool registry, schemas, and handlers
pub mod tools;
