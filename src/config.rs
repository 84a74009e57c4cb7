// ABOUTME: Environment-driven server configuration
// ABOUTME: Credentials, response limits, overflow TTLs, and API base URL
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

//! Environment-based configuration. Everything has a default except the
//! Garmin credentials, which are validated at login time rather than load
//! time so the server can still start and report a usable error through
//! the protocol.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::constants::{endpoints, env_names, limits};
use crate::limits::ResponseLimits;

/// Garmin Connect account credentials
#[derive(Debug, Clone)]
pub struct GarminCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl GarminCredentials {
    /// Whether both halves of the credential pair are present
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Garmin account credentials for the fallback credential login
    pub credentials: GarminCredentials,
    /// Directory holding saved OAuth tokens (defaults to `~/.garminconnect`)
    pub token_dir: PathBuf,
    /// Garmin Connect API base URL
    pub api_base_url: String,
    /// Response byte budget and overflow thresholds
    pub limits: ResponseLimits,
    /// Interval between background overflow sweeps
    pub sweep_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for everything except credentials.
    #[must_use]
    pub fn from_env() -> Self {
        let credentials = GarminCredentials {
            username: env::var(env_names::GARMIN_USERNAME).ok(),
            password: env::var(env_names::GARMIN_PASSWORD).ok(),
        };

        let token_dir = env::var(env_names::GARMIN_TOKEN_DIR).map_or_else(
            |_| default_token_dir(),
            PathBuf::from,
        );

        let api_base_url = env::var(env_names::GARMIN_API_BASE_URL)
            .unwrap_or_else(|_| endpoints::DEFAULT_API_BASE_URL.to_owned());

        let max_response_bytes = parse_env_usize(
            env_names::MAX_RESPONSE_BYTES,
            limits::DEFAULT_MAX_RESPONSE_BYTES,
        );
        let field_threshold_bytes = parse_env_usize(
            env_names::OVERFLOW_FIELD_THRESHOLD_BYTES,
            limits::DEFAULT_FIELD_THRESHOLD_BYTES,
        );
        let overflow_ttl_secs = parse_env_u64(
            env_names::OVERFLOW_TTL_SECS,
            limits::DEFAULT_OVERFLOW_TTL_SECS,
        );
        let sweep_interval_secs = parse_env_u64(
            env_names::OVERFLOW_SWEEP_INTERVAL_SECS,
            limits::DEFAULT_SWEEP_INTERVAL_SECS,
        );

        if field_threshold_bytes >= max_response_bytes {
            warn!(
                threshold = field_threshold_bytes,
                ceiling = max_response_bytes,
                "field threshold should be well below the response ceiling; diversion may be ineffective"
            );
        }

        Self {
            credentials,
            token_dir,
            api_base_url,
            limits: ResponseLimits {
                max_response_bytes,
                field_threshold_bytes,
                overflow_ttl: Duration::from_secs(overflow_ttl_secs),
            },
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            credentials: GarminCredentials {
                username: None,
                password: None,
            },
            token_dir: default_token_dir(),
            api_base_url: endpoints::DEFAULT_API_BASE_URL.to_owned(),
            limits: ResponseLimits::default(),
            sweep_interval: Duration::from_secs(limits::DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

fn default_token_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".garminconnect")
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    env::var(name).ok().map_or(default, |raw| {
        raw.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "unparseable value, using default");
            default
        })
    })
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    env::var(name).ok().map_or(default, |raw| {
        raw.parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "unparseable value, using default");
            default
        })
    })
}
