// ABOUTME: Tests for Garmin client login against saved token files
// ABOUTME: No network: a live token file authenticates, an expired one without credentials fails
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

use garmin_mcp_server::config::{GarminCredentials, ServerConfig};
use garmin_mcp_server::errors::GarminError;
use garmin_mcp_server::garmin::GarminClient;

fn config_with_token_dir(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        credentials: GarminCredentials {
            username: None,
            password: None,
        },
        token_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

fn write_token_file(dir: &TempDir, expires_in_secs: i64) {
    let expires_at = Utc::now() + chrono::Duration::seconds(expires_in_secs);
    let token = json!({
        "access_token": "stored-token",
        "expires_at": expires_at,
    });
    std::fs::write(
        dir.path().join("oauth2_token.json"),
        serde_json::to_string_pretty(&token).unwrap(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_login_with_live_stored_token() {
    let dir = TempDir::new().unwrap();
    write_token_file(&dir, 3_600);

    let client = GarminClient::new(&config_with_token_dir(&dir));
    assert!(client.login().await.is_ok());
}

#[tokio::test]
async fn test_expired_token_without_credentials_is_auth_error() {
    let dir = TempDir::new().unwrap();
    write_token_file(&dir, -60);

    let client = GarminClient::new(&config_with_token_dir(&dir));
    let err = client.login().await.unwrap_err();
    assert!(matches!(err, GarminError::Auth(_)));
    assert!(err.to_string().contains("GARMIN_USERNAME"));
}

#[tokio::test]
async fn test_missing_token_file_without_credentials_is_auth_error() {
    let dir = TempDir::new().unwrap();
    let client = GarminClient::new(&config_with_token_dir(&dir));
    assert!(matches!(
        client.login().await.unwrap_err(),
        GarminError::Auth(_)
    ));
}

#[tokio::test]
async fn test_corrupt_token_file_falls_through_to_auth_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("oauth2_token.json"), "not json at all").unwrap();

    let client = GarminClient::new(&config_with_token_dir(&dir));
    assert!(matches!(
        client.login().await.unwrap_err(),
        GarminError::Auth(_)
    ));
}
