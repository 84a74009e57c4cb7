// ABOUTME: Explicit retry wrapper for remote calls with typed retryability
// ABOUTME: Exponential backoff, steeper for rate limits; auth and not-found never retry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::errors::{AppResult, GarminError};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts including the first
    pub max_attempts: u32,
    /// Initial backoff delay
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the next attempt after `attempt` failures.
    /// Rate limits back off with base 3, everything else with base 2.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32, error: &GarminError) -> Duration {
        let base: u32 = if matches!(error, GarminError::RateLimited(_)) {
            3
        } else {
            2
        };
        self.initial_delay * base.pow(attempt)
    }
}

/// Run `op`, retrying only errors the taxonomy marks retryable (network,
/// rate-limited). Non-retryable errors propagate immediately.
///
/// # Errors
///
/// Returns the final error once attempts are exhausted
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation_name: &str, op: F) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                debug!(operation = operation_name, error = %e, "non-retryable error");
                return Err(e);
            }
            Err(e) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    error!(
                        operation = operation_name,
                        attempts = policy.max_attempts,
                        error = %e,
                        "retries exhausted"
                    );
                    return Err(e);
                }
                let delay = policy.backoff_for(attempt - 1, &e);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
        };
        let result: AppResult<()> = with_retry(&policy, "auth", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GarminError::Auth("401".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_eventually_succeeds() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
        };
        let result = with_retry(&policy, "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(GarminError::Network("reset".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_rate_limit_backs_off_harder() {
        let policy = RetryPolicy::default();
        let network = GarminError::Network("t".into());
        let limited = GarminError::RateLimited("429".into());
        assert_eq!(policy.backoff_for(2, &network), Duration::from_secs(4));
        assert_eq!(policy.backoff_for(2, &limited), Duration::from_secs(9));
    }
}
