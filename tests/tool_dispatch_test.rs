// ABOUTME: End-to-end tests for tool dispatch over a stubbed Garmin API
// ABOUTME: Covers cursor paging across calls, cache wrapping, error payloads, and overflow diversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use garmin_mcp_server::config::ServerConfig;
use garmin_mcp_server::errors::{AppResult, GarminError};
use garmin_mcp_server::garmin::GarminApi;
use garmin_mcp_server::jsonrpc::JsonRpcRequest;
use garmin_mcp_server::mcp::{McpServer, ServerResources};
use garmin_mcp_server::pagination::decode_cursor;

/// Canned-data stand-in for Garmin Connect
#[derive(Default)]
struct StubApi {
    max_metrics_calls: AtomicU32,
}

fn running_activity(id: u64) -> Value {
    json!({
        "activityId": id,
        "activityName": format!("Morning Run {id}"),
        "activityType": {"typeKey": "running"},
        "startTimeLocal": format!("2026-{:02}-10 07:00:00", 1 + id % 8),
        "distance": 8_000.0 + id as f64,
        "averageSpeed": 3.2,
    })
}

#[async_trait]
impl GarminApi for StubApi {
    async fn activities_by_date(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> AppResult<Vec<Value>> {
        // 25 runs interleaved with rides the filter must drop.
        let mut activities = Vec::new();
        for id in 0..25 {
            activities.push(running_activity(id));
            activities.push(json!({
                "activityId": 1000 + id,
                "activityType": {"typeKey": "cycling"},
                "startTimeLocal": "2026-08-09 09:00:00",
                "distance": 40_000.0,
            }));
        }
        Ok(activities)
    }

    async fn activity(&self, activity_id: u64) -> AppResult<Value> {
        Ok(json!({
            "activityId": activity_id,
            "activityName": "Tempo Tuesday",
            "activityType": {"typeKey": "running"},
            "startTimeLocal": "2026-08-04 18:30:00",
            "distance": 12_000.0,
            "duration": 3_600.0,
            "averageSpeed": 1000.0 / 300.0,
            "elevationGain": 130.0,
            "calories": 700.0,
            "averageHR": 156,
            "maxHR": 181,
            "aerobicTrainingEffect": 3.6,
        }))
    }

    async fn activity_details(&self, activity_id: u64) -> AppResult<Value> {
        // Large enough that the detail response blows the test budget.
        Ok(json!({
            "activityId": activity_id,
            "summaryDTO": {"normalizedPower": 250, "trainingStressScore": 81.0},
            "metricDescriptors": [{"key": "directHeartRate"}],
            "stream": "x".repeat(200_000),
        }))
    }

    async fn activity_splits(&self, _activity_id: u64) -> AppResult<Value> {
        Ok(json!([{"distance": 1000.0, "movingDuration": 290.0}]))
    }

    async fn activity_weather(&self, _activity_id: u64) -> AppResult<Value> {
        Err(GarminError::NotFound("no weather recorded".into()))
    }

    async fn personal_records(&self) -> AppResult<Value> {
        Ok(json!([
            {"typeId": 3, "value": 1_212.0, "activityId": 11, "prStartTimeLocalFormatted": "2026-05-01"},
            {"typeId": 6, "value": 11_160.0, "activityId": 12, "prStartTimeLocalFormatted": "2026-04-06"},
            {"typeId": 99, "value": 1.0}
        ]))
    }

    async fn max_metrics(&self, _date: NaiveDate) -> AppResult<Value> {
        self.max_metrics_calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!([{"generic": {"maxMet": 52.3}, "fitnessTrendData": [51.8, 52.0, 52.3]}]))
    }

    async fn training_status(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!({"trainingStatusType": "PRODUCTIVE", "recoveryTime": 18}))
    }

    async fn training_readiness(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!([{"score": 71, "level": "HIGH", "sleepQuality": 80}]))
    }

    async fn race_predictions(&self) -> AppResult<Value> {
        Ok(json!([
            {"distance": 5000, "time": 1_230.0, "raceReadinessLevel": "READY"},
            {"distance": 21097.5, "time": 5_700.0}
        ]))
    }

    async fn resting_heart_rate(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!({
            "allMetrics": {"metricsMap": {"WELLNESS_RESTING_HEART_RATE": [{"value": 44}]}}
        }))
    }

    async fn heart_rate_zones(&self) -> AppResult<Value> {
        Ok(json!([{"zoneNumber": 1, "zoneLowBoundary": 98}]))
    }

    async fn sleep_data(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!({
            "sleepTimeSeconds": 27_000,
            "deepSleepSeconds": 5_400,
            "lightSleepSeconds": 14_400,
            "remSleepSeconds": 5_400,
            "awakeSleepSeconds": 1_800,
            "sleepScore": 82
        }))
    }

    async fn body_battery(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!([{"level": 35, "charged": 60, "drained": 80}]))
    }

    async fn stress_data(&self, _date: NaiveDate) -> AppResult<Value> {
        Ok(json!([{"value": 25.0}, {"value": 40.0}, {"value": -1.0}, {"value": 31.0}]))
    }
}

fn test_server(api: Arc<StubApi>) -> McpServer {
    // Budget low enough that the stubbed detail stream overflows it.
    let config = ServerConfig {
        limits: garmin_mcp_server::limits::ResponseLimits {
            max_response_bytes: 50_000,
            field_threshold_bytes: 10_000,
            overflow_ttl: std::time::Duration::from_secs(3_600),
        },
        ..ServerConfig::default()
    };
    McpServer::new(Arc::new(ServerResources::new(api, config)))
}

async fn call_tool(server: &McpServer, name: &str, args: Value) -> Value {
    let request = JsonRpcRequest::new(
        "tools/call",
        Some(json!({"name": name, "arguments": args})),
    );
    let response = server.handle_request(request).await.unwrap();
    assert!(response.error.is_none(), "unexpected protocol error");
    response.result.unwrap()
}

#[tokio::test]
async fn test_activity_listing_pages_through_cursors() {
    let server = test_server(Arc::new(StubApi::default()));

    // Page one: runs only, rides filtered out.
    let result = call_tool(
        &server,
        "get_recent_running_activities",
        json!({"page_size": 10, "days_back": 30}),
    )
    .await;
    let page = &result["structuredContent"];
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["activityId"], json!(0));
    assert!(items
        .iter()
        .all(|a| a["activityType"]["typeKey"] == json!("running")));
    assert_eq!(page["pagination"]["hasMore"], json!(true));

    let cursor = page["pagination"]["nextCursor"].as_str().unwrap().to_owned();
    let state = decode_cursor(&cursor).unwrap();
    assert_eq!(state.get("offset"), Some(&json!(10)));
    assert_eq!(state.get("days_back"), Some(&json!(30)));

    // Page two via the cursor alone.
    let result = call_tool(
        &server,
        "get_recent_running_activities",
        json!({"page_size": 10, "cursor": cursor}),
    )
    .await;
    let page = &result["structuredContent"];
    assert_eq!(page["items"][0]["activityId"], json!(10));
    assert_eq!(page["pagination"]["hasMore"], json!(true));
    let cursor = page["pagination"]["nextCursor"].as_str().unwrap().to_owned();

    // Page three is the 5-item tail.
    let result = call_tool(
        &server,
        "get_recent_running_activities",
        json!({"page_size": 10, "cursor": cursor}),
    )
    .await;
    let page = &result["structuredContent"];
    assert_eq!(page["items"].as_array().unwrap().len(), 5);
    assert_eq!(page["pagination"]["hasMore"], json!(false));
    assert!(page["pagination"].get("nextCursor").is_none());
}

#[tokio::test]
async fn test_garbage_cursor_restarts_from_page_one() {
    let server = test_server(Arc::new(StubApi::default()));
    let result = call_tool(
        &server,
        "get_recent_running_activities",
        json!({"page_size": 10, "cursor": "!!corrupted!!"}),
    )
    .await;
    let page = &result["structuredContent"];
    assert_eq!(page["items"][0]["activityId"], json!(0));
}

#[tokio::test]
async fn test_oversized_details_divert_and_read_back() {
    let server = test_server(Arc::new(StubApi::default()));

    let result = call_tool(
        &server,
        "get_activity_details",
        json!({"activity_id": 42}),
    )
    .await;
    let content = &result["structuredContent"];

    assert_eq!(result["isError"], json!(false));
    assert!(content.get("detailed_metrics").is_none());
    let uri = content["detailed_metrics_resource"].as_str().unwrap().to_owned();
    assert_eq!(
        content["_overflow_info"]["fields_moved"],
        json!(["detailed_metrics"])
    );

    // The small shaped fields survive inline.
    assert_eq!(content["activity_id"], json!(42));
    assert_eq!(content["gps_data_available"], json!(true));

    // resources/read returns the diverted payload.
    let request = JsonRpcRequest::new("resources/read", Some(json!({"uri": uri})));
    let response = server.handle_request(request).await.unwrap();
    let text = response.result.unwrap()["contents"][0]["text"]
        .as_str()
        .unwrap()
        .to_owned();
    let payload: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(payload["stream"].as_str().unwrap().len(), 200_000);

    // And the resource shows up in resources/list until it expires.
    let request = JsonRpcRequest::new("resources/list", None);
    let response = server.handle_request(request).await.unwrap();
    let resources = response.result.unwrap()["resources"].as_array().unwrap().clone();
    assert!(resources.iter().any(|r| r["uri"] == json!(uri)));
}

#[tokio::test]
async fn test_fetch_tools_are_cached_per_arguments() {
    let api = Arc::new(StubApi::default());
    let server = test_server(api.clone());

    let first = call_tool(&server, "get_vo2max", json!({"date": "2026-08-07"})).await;
    assert_eq!(first["structuredContent"]["vo2_max"], json!(52.3));
    let calls_after_first = api.max_metrics_calls.load(Ordering::SeqCst);

    let _second = call_tool(&server, "get_vo2max", json!({"date": "2026-08-07"})).await;
    assert_eq!(
        api.max_metrics_calls.load(Ordering::SeqCst),
        calls_after_first,
        "second identical call must hit the cache"
    );

    // Different arguments miss the cache.
    let _third = call_tool(&server, "get_vo2max", json!({"date": "2026-08-06"})).await;
    assert!(api.max_metrics_calls.load(Ordering::SeqCst) > calls_after_first);
}

#[tokio::test]
async fn test_missing_required_param_is_absorbed_error() {
    let server = test_server(Arc::new(StubApi::default()));
    let result = call_tool(&server, "get_activity_summary", json!({})).await;
    assert_eq!(result["isError"], json!(true));
    assert_eq!(
        result["structuredContent"]["error"],
        json!("Missing required parameters: activity_id")
    );
}

#[tokio::test]
async fn test_optional_section_failure_degrades_to_null() {
    let server = test_server(Arc::new(StubApi::default()));
    let result = call_tool(&server, "get_activity_details", json!({"activity_id": 1})).await;
    // Weather fetch fails in the stub; the tool still succeeds with null.
    assert_eq!(result["isError"], json!(false));
    assert_eq!(result["structuredContent"]["weather"], Value::Null);
}

#[tokio::test]
async fn test_shaped_metrics_extraction() {
    let server = test_server(Arc::new(StubApi::default()));

    let records = call_tool(&server, "get_personal_records", json!({})).await;
    let records = &records["structuredContent"]["personal_records"];
    assert_eq!(records["5K"]["time"], json!("20:12"));
    assert_eq!(records["marathon"]["time"], json!("03:06:00"));
    assert!(records.get("10K").is_none());

    let sleep = call_tool(&server, "get_sleep_analysis", json!({"date": "2026-08-07"})).await;
    assert_eq!(
        sleep["structuredContent"]["sleep_summary"]["total_sleep_hours"],
        json!(7.5)
    );

    let stress = call_tool(&server, "get_stress_levels", json!({"date": "2026-08-07"})).await;
    let summary = &stress["structuredContent"]["stress_summary"];
    // Negative sentinel readings are excluded from the statistics.
    assert_eq!(summary["average_stress"], json!(32.0));
    assert_eq!(summary["max_stress"], json!(40.0));
    assert_eq!(summary["min_stress"], json!(25.0));

    let hr = call_tool(&server, "get_heart_rate_metrics", json!({"date": "2026-08-07"})).await;
    assert_eq!(hr["structuredContent"]["resting_heart_rate"], json!(44));

    let predictions = call_tool(&server, "get_race_predictions", json!({})).await;
    let predicted = &predictions["structuredContent"]["race_predictions"];
    assert_eq!(predicted["5K"]["predicted_time"], json!("20:30"));
    assert_eq!(predicted["half_marathon"]["predicted_time"], json!("01:35:00"));
}

#[tokio::test]
async fn test_pure_calculation_tools() {
    let server = test_server(Arc::new(StubApi::default()));

    let paces = call_tool(
        &server,
        "calculate_training_paces",
        json!({"race_distance": "10K", "race_time": "45:00"}),
    )
    .await;
    let content = &paces["structuredContent"];
    assert_eq!(content["race_performance"]["pace_per_km"], json!("4:30"));
    assert_eq!(content["training_paces"]["easy_pace"], json!("5:24"));
    assert_eq!(content["training_paces"]["threshold_pace"], json!("4:16"));

    let zones = call_tool(
        &server,
        "calculate_vdot_zones",
        json!({"race_distance": "5K", "race_time": "20:00"}),
    )
    .await;
    let content = &zones["structuredContent"];
    assert!(content["vdot"].as_f64().unwrap() > 40.0);
    assert!(content["training_zones"]["threshold"]["pace_per_km"].is_string());
    assert!(content["equivalent_race_times"]["marathon"].is_string());

    let invalid = call_tool(
        &server,
        "calculate_vdot_zones",
        json!({"race_distance": "50K", "race_time": "20:00"}),
    )
    .await;
    assert_eq!(invalid["isError"], json!(true));
}
