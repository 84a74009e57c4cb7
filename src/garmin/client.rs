// ABOUTME: Garmin Connect HTTP client with token-file login and typed error mapping
// ABOUTME: Status codes and transport failures are classified into GarminError exactly once, here
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::retry::{with_retry, RetryPolicy};
use super::GarminApi;
use crate::config::ServerConfig;
use crate::constants::endpoints;
use crate::errors::{AppResult, GarminError};

/// Saved OAuth token file name inside the token directory
const TOKEN_FILE: &str = "oauth2_token.json";

/// Refresh the session this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Global shared HTTP client with connection pooling
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or create the shared HTTP client
fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Active session handle
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_live(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Token exchange response from the OAuth endpoint
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Concrete Garmin Connect client.
///
/// Login prefers saved tokens from the token directory and falls back to a
/// credential exchange; both paths end in the same opaque session handle.
pub struct GarminClient {
    client: Client,
    base_url: String,
    token_dir: PathBuf,
    username: Option<String>,
    password: Option<String>,
    session: RwLock<Option<Session>>,
    retry: RetryPolicy,
}

impl GarminClient {
    /// Create a client from server configuration
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: shared_client().clone(),
            base_url: config.api_base_url.clone(),
            token_dir: config.token_dir.clone(),
            username: config.credentials.username.clone(),
            password: config.credentials.password.clone(),
            session: RwLock::new(None),
            retry: RetryPolicy::default(),
        }
    }

    /// Authenticate, preferring stored tokens over a credential exchange.
    ///
    /// # Errors
    ///
    /// Returns `GarminError::Auth` when no stored token is usable and the
    /// credential login fails or credentials are missing
    pub async fn login(&self) -> AppResult<()> {
        if let Some(session) = self.load_saved_session() {
            info!("authenticated with stored tokens");
            *self.session.write().await = Some(session);
            return Ok(());
        }

        let session = self.credential_login().await?;
        self.save_session(&session);
        *self.session.write().await = Some(session);
        info!("authenticated with credentials");
        Ok(())
    }

    fn load_saved_session(&self) -> Option<Session> {
        let path = self.token_dir.join(TOKEN_FILE);
        let raw = std::fs::read_to_string(&path).ok()?;
        let session: Session = serde_json::from_str(&raw)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "unreadable token file");
                e
            })
            .ok()?;
        if session.is_live() {
            Some(session)
        } else {
            debug!("stored token expired");
            None
        }
    }

    fn save_session(&self, session: &Session) {
        // Best effort; a failed save only means re-authenticating next run.
        let path = self.token_dir.join(TOKEN_FILE);
        let result = std::fs::create_dir_all(&self.token_dir).and_then(|()| {
            let raw = serde_json::to_string_pretty(session)?;
            std::fs::write(&path, raw)
        });
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "failed to save session tokens");
        }
    }

    async fn credential_login(&self) -> AppResult<Session> {
        let (Some(username), Some(password)) = (self.username.as_deref(), self.password.as_deref())
        else {
            return Err(GarminError::Auth(
                "GARMIN_USERNAME and GARMIN_PASSWORD must be set when no stored tokens exist"
                    .to_owned(),
            ));
        };

        let url = format!("{}{}", self.base_url, endpoints::OAUTH_EXCHANGE);
        let response = self
            .client
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GarminError::Auth(format!(
                    "credential login rejected with status {status}"
                )),
                StatusCode::TOO_MANY_REQUESTS => {
                    GarminError::RateLimited(format!("login rate limited ({status})"))
                }
                _ => GarminError::Api(format!("login failed with status {status}")),
            });
        }

        let token: TokenExchangeResponse = response
            .json()
            .await
            .map_err(|e| GarminError::Api(format!("unparseable token response: {e}")))?;

        let expires_in = token.expires_in.unwrap_or(3_600);
        Ok(Session {
            access_token: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        })
    }

    /// Current bearer token, re-authenticating if the session lapsed
    async fn bearer_token(&self) -> AppResult<String> {
        {
            let guard = self.session.read().await;
            if let Some(session) = guard.as_ref() {
                if session.is_live() {
                    return Ok(session.access_token.clone());
                }
            }
        }
        debug!("session missing or expired, re-authenticating");
        self.login().await?;
        let guard = self.session.read().await;
        guard
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| GarminError::Auth("no active session".to_owned()))
    }

    /// Authenticated GET with retry. The single place remote failures are
    /// classified into the error taxonomy.
    async fn api_get(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.bearer_token().await?;

        with_retry(&self.retry, path, || {
            let url = url.clone();
            let token = token.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .query(query)
                    .bearer_auth(&token)
                    .send()
                    .await
                    .map_err(classify_transport_error)?;

                let status = response.status();
                if !status.is_success() {
                    return Err(classify_status(status, &url));
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| GarminError::Api(format!("unparseable response from {url}: {e}")))
            }
        })
        .await
    }

    fn date_path(base: &str, date: NaiveDate) -> String {
        format!("{base}/{}", date.format("%Y-%m-%d"))
    }
}

/// Map an HTTP status onto the error taxonomy
fn classify_status(status: StatusCode, url: &str) -> GarminError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GarminError::Auth(format!("request to {url} rejected ({status})"))
        }
        StatusCode::NOT_FOUND => GarminError::NotFound(format!("no data at {url}")),
        StatusCode::TOO_MANY_REQUESTS => {
            GarminError::RateLimited(format!("rate limited at {url}"))
        }
        s if s.is_server_error() => {
            GarminError::Network(format!("upstream failure at {url} ({status})"))
        }
        _ => GarminError::Api(format!("request to {url} failed with status {status}")),
    }
}

/// Map a transport-level failure onto the error taxonomy
fn classify_transport_error(e: reqwest::Error) -> GarminError {
    if e.is_timeout() || e.is_connect() {
        GarminError::Network(e.to_string())
    } else {
        GarminError::Api(e.to_string())
    }
}

#[async_trait]
impl GarminApi for GarminClient {
    async fn activities_by_date(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Value>> {
        let value = self
            .api_get(
                endpoints::ACTIVITIES_BY_DATE,
                &[
                    ("startDate", start.format("%Y-%m-%d").to_string()),
                    ("endDate", end.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;
        match value {
            Value::Array(items) => Ok(items),
            other => Err(GarminError::Api(format!(
                "expected an activity list, got {}",
                type_name(&other)
            ))),
        }
    }

    async fn activity(&self, activity_id: u64) -> AppResult<Value> {
        self.api_get(&format!("{}/{activity_id}", endpoints::ACTIVITY), &[])
            .await
    }

    async fn activity_details(&self, activity_id: u64) -> AppResult<Value> {
        self.api_get(
            &format!("{}/{activity_id}/details", endpoints::ACTIVITY),
            &[],
        )
        .await
    }

    async fn activity_splits(&self, activity_id: u64) -> AppResult<Value> {
        self.api_get(
            &format!("{}/{activity_id}/splits", endpoints::ACTIVITY),
            &[],
        )
        .await
    }

    async fn activity_weather(&self, activity_id: u64) -> AppResult<Value> {
        self.api_get(
            &format!("{}/{activity_id}/weather", endpoints::ACTIVITY),
            &[],
        )
        .await
    }

    async fn personal_records(&self) -> AppResult<Value> {
        self.api_get(endpoints::PERSONAL_RECORDS, &[]).await
    }

    async fn max_metrics(&self, date: NaiveDate) -> AppResult<Value> {
        let day = date.format("%Y-%m-%d");
        self.api_get(&format!("{}/{day}/{day}", endpoints::MAX_METRICS), &[])
            .await
    }

    async fn training_status(&self, date: NaiveDate) -> AppResult<Value> {
        self.api_get(&Self::date_path(endpoints::TRAINING_STATUS, date), &[])
            .await
    }

    async fn training_readiness(&self, date: NaiveDate) -> AppResult<Value> {
        self.api_get(&Self::date_path(endpoints::TRAINING_READINESS, date), &[])
            .await
    }

    async fn race_predictions(&self) -> AppResult<Value> {
        self.api_get(endpoints::RACE_PREDICTIONS, &[]).await
    }

    async fn resting_heart_rate(&self, date: NaiveDate) -> AppResult<Value> {
        self.api_get(
            endpoints::DAILY_RHR,
            &[("date", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    async fn heart_rate_zones(&self) -> AppResult<Value> {
        self.api_get(endpoints::HEART_RATE_ZONES, &[]).await
    }

    async fn sleep_data(&self, date: NaiveDate) -> AppResult<Value> {
        self.api_get(
            endpoints::DAILY_SLEEP,
            &[("date", date.format("%Y-%m-%d").to_string())],
        )
        .await
    }

    async fn body_battery(&self, date: NaiveDate) -> AppResult<Value> {
        let day = date.format("%Y-%m-%d").to_string();
        self.api_get(
            endpoints::BODY_BATTERY,
            &[("startDate", day.clone()), ("endDate", day)],
        )
        .await
    }

    async fn stress_data(&self, date: NaiveDate) -> AppResult<Value> {
        self.api_get(&Self::date_path(endpoints::DAILY_STRESS, date), &[])
            .await
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "u"),
            GarminError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "u"),
            GarminError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "u"),
            GarminError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "u"),
            GarminError::Network(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::IM_A_TEAPOT, "u"),
            GarminError::Api(_)
        ));
    }

    #[test]
    fn test_session_liveness_margin() {
        let live = Session {
            access_token: "t".into(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        assert!(live.is_live());

        let nearly_expired = Session {
            access_token: "t".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(EXPIRY_MARGIN_SECS / 2),
        };
        assert!(!nearly_expired.is_live());
    }
}
