// ABOUTME: Typed error taxonomy for Garmin Connect API failures
// ABOUTME: Classification happens once at the HTTP boundary, never by message sniffing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Error Handling
//!
//! Remote-call failures are classified into a small taxonomy at the client
//! boundary so every other layer can branch on the variant instead of
//! inspecting error text. Tool handlers absorb these errors into structured
//! payloads; nothing in this module ever terminates a request.

use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for fallible operations in this crate
pub type AppResult<T> = Result<T, GarminError>;

/// Categorized Garmin Connect failure
#[derive(Debug, Error)]
pub enum GarminError {
    /// Authentication failed or the session expired
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The requested data does not exist upstream
    #[error("data not found: {0}")]
    NotFound(String),

    /// Upstream rate limit was hit and retries were exhausted
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// Transport-level failure (timeout, connection reset, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// The metric requires device capabilities the account lacks
    #[error("device capability required: {0}")]
    DeviceUnsupported(String),

    /// A tool was called with missing or malformed parameters
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Server-side configuration problem (missing credentials, bad values)
    #[error("configuration error: {0}")]
    Config(String),

    /// Anything the boundary could not classify
    #[error("API call failed: {0}")]
    Api(String),
}

impl GarminError {
    /// Wire-visible error type name, kept compatible with what clients of
    /// the original server already match on.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Auth(_) => "GarminAuthenticationError",
            Self::NotFound(_) => "GarminDataNotFoundError",
            Self::RateLimited(_) => "GarminRateLimitError",
            Self::Network(_) => "GarminNetworkError",
            Self::DeviceUnsupported(_) => "GarminDeviceRequiredError",
            Self::InvalidParams(_) => "InvalidParametersError",
            Self::Config(_) => "ConfigurationError",
            Self::Api(_) => "GarminAPIError",
        }
    }

    /// Guidance surfaced to the end user alongside the error
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(_) => {
                "Please check your Garmin Connect credentials or re-authenticate using the setup script"
            }
            Self::NotFound(_) => {
                "The requested data is not available. Please ensure your Garmin device is syncing properly"
            }
            Self::RateLimited(_) => "Too many requests. Please wait a few moments before trying again",
            Self::Network(_) => "Connection issue. Please check your internet connection and try again",
            Self::DeviceUnsupported(_) => {
                "This feature requires a compatible Garmin device with the necessary sensors"
            }
            Self::InvalidParams(_) => "One or more tool parameters are missing or invalid",
            Self::Config(_) => "The server is misconfigured. Please check the environment variables",
            Self::Api(_) => "An unexpected error occurred. Please try again later",
        }
    }

    /// Whether a retry has any chance of succeeding
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited(_))
    }

    /// Convert into the structured payload tool callers receive instead of
    /// a protocol-level error.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        match self {
            Self::InvalidParams(msg) => json!({ "error": msg }),
            _ => json!({
                "error": self.to_string(),
                "error_type": self.error_type(),
                "user_message": self.user_message(),
            }),
        }
    }

    /// Missing-parameter convenience constructor
    #[must_use]
    pub fn missing_params(names: &[&str]) -> Self {
        Self::InvalidParams(format!("Missing required parameters: {}", names.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GarminError::Network("timeout".into()).is_retryable());
        assert!(GarminError::RateLimited("429".into()).is_retryable());
        assert!(!GarminError::Auth("401".into()).is_retryable());
        assert!(!GarminError::NotFound("404".into()).is_retryable());
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = GarminError::Auth("session expired".into()).to_payload();
        assert_eq!(payload["error_type"], "GarminAuthenticationError");
        assert!(payload["user_message"].as_str().unwrap().contains("credentials"));

        // Parameter validation errors carry only the message, matching the
        // lighter shape clients expect for caller mistakes.
        let payload = GarminError::missing_params(&["activity_id"]).to_payload();
        assert_eq!(
            payload["error"],
            "Missing required parameters: activity_id"
        );
        assert!(payload.get("error_type").is_none());
    }
}
