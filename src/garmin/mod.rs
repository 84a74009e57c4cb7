// ABOUTME: Garmin Connect client abstraction and shared provider types
// ABOUTME: The GarminApi trait is the seam between tool handlers and the remote service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

//! # Garmin Connect Provider
//!
//! Tool handlers depend on the [`GarminApi`] trait, not the concrete
//! client, so tests can substitute canned payloads and the handlers stay
//! network-free. The concrete [`client::GarminClient`] owns HTTP, token
//! handling, retry, and the status-code-to-taxonomy mapping; nothing past
//! this boundary ever inspects error text.

/// Concrete reqwest-backed client
pub mod client;
/// Retry wrapper for remote calls
pub mod retry;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::AppResult;

pub use client::GarminClient;

/// Remote operations the tool handlers consume.
///
/// Every method returns the raw JSON payload; shaping happens in the
/// handlers. Errors arrive pre-classified into the [`crate::errors::GarminError`]
/// taxonomy.
#[async_trait]
pub trait GarminApi: Send + Sync {
    /// Activities between two dates, newest first
    async fn activities_by_date(&self, start: NaiveDate, end: NaiveDate)
        -> AppResult<Vec<Value>>;

    /// Basic activity record
    async fn activity(&self, activity_id: u64) -> AppResult<Value>;

    /// Full detail payload including metric streams
    async fn activity_details(&self, activity_id: u64) -> AppResult<Value>;

    /// Per-lap splits
    async fn activity_splits(&self, activity_id: u64) -> AppResult<Value>;

    /// Recorded weather for the activity
    async fn activity_weather(&self, activity_id: u64) -> AppResult<Value>;

    /// All personal records for the account
    async fn personal_records(&self) -> AppResult<Value>;

    /// VO2 Max and related max metrics for a day
    async fn max_metrics(&self, date: NaiveDate) -> AppResult<Value>;

    /// Aggregated training status for a day
    async fn training_status(&self, date: NaiveDate) -> AppResult<Value>;

    /// Training readiness for a day
    async fn training_readiness(&self, date: NaiveDate) -> AppResult<Value>;

    /// Latest race predictions
    async fn race_predictions(&self) -> AppResult<Value>;

    /// Daily resting heart rate payload
    async fn resting_heart_rate(&self, date: NaiveDate) -> AppResult<Value>;

    /// Configured heart rate zones
    async fn heart_rate_zones(&self) -> AppResult<Value>;

    /// Sleep data for a night
    async fn sleep_data(&self, date: NaiveDate) -> AppResult<Value>;

    /// Body battery readings for a day
    async fn body_battery(&self, date: NaiveDate) -> AppResult<Value>;

    /// Stress readings for a day
    async fn stress_data(&self, date: NaiveDate) -> AppResult<Value>;
}
