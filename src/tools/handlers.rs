// ABOUTME: Tool handlers that fetch Garmin data and shape it for assistant consumption
// ABOUTME: Each handler extracts key fields, converts units, and keeps raw payloads alongside
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright (c) 2025 garmin-mcp-server contributors

//! Fetch-and-shape handlers for every tool. Handlers are plain async
//! functions over the [`GarminApi`] seam; caching, error absorption, and
//! size guarding are layered on by the dispatcher, so nothing here knows
//! about those concerns. Listing handlers slice through the cursor
//! pagination module.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::analytics::{
    equivalent_race_times, format_pace, format_time, meters_per_second_to_pace, parse_time,
    race_distance_meters, training_paces_from_vdot, vdot_from_time,
};
use crate::constants::{DISTANCE_TYPE_IDS, RUNNING_ACTIVITY_TYPES};
use crate::errors::{AppResult, GarminError};
use crate::garmin::GarminApi;
use crate::pagination::{build_page, cursor_offset, decode_cursor, CursorState};

/// Tool invocation arguments
pub type ToolArgs = Map<String, Value>;

// ── Argument helpers ────────────────────────────────────────────────────

fn arg_date(args: &ToolArgs) -> AppResult<NaiveDate> {
    match args.get("date").and_then(Value::as_str) {
        None => Ok(Utc::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            GarminError::InvalidParams(format!("Invalid date: {raw}. Use YYYY-MM-DD"))
        }),
    }
}

fn required_u64(args: &ToolArgs, name: &str) -> AppResult<u64> {
    args.get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| GarminError::missing_params(&[name]))
}

fn required_str<'a>(args: &'a ToolArgs, name: &str) -> AppResult<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| GarminError::missing_params(&[name]))
}

fn arg_usize(args: &ToolArgs, name: &str, default: usize) -> usize {
    args.get(name)
        .and_then(Value::as_u64)
        .map_or(default, |n| n as usize)
}

fn cursor_from_args(args: &ToolArgs) -> Option<CursorState> {
    args.get("cursor")
        .and_then(Value::as_str)
        .and_then(decode_cursor)
}

/// Fold a secondary fetch failure into `null` instead of failing the tool.
/// Mirrors how the upstream payloads themselves treat missing sections.
fn absorb(result: AppResult<Value>, what: &str) -> Value {
    result.unwrap_or_else(|e| {
        warn!(section = what, error = %e, "optional fetch failed");
        Value::Null
    })
}

fn is_running_activity(activity: &Value) -> bool {
    activity
        .get("activityType")
        .and_then(|t| t.get("typeKey"))
        .and_then(Value::as_str)
        .is_some_and(|key| RUNNING_ACTIVITY_TYPES.contains(&key))
}

fn filter_running(activities: Vec<Value>) -> Vec<Value> {
    activities.into_iter().filter(is_running_activity).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ── Listing tools (cursor-paginated) ────────────────────────────────────

/// Recent running activities, newest first, one cursor page at a time.
/// The cursor echoes `days_back` so a resumed page re-queries the same
/// window even if the caller omits the argument.
pub async fn get_recent_running_activities(
    api: &dyn GarminApi,
    args: &ToolArgs,
) -> AppResult<Value> {
    let page_size = arg_usize(args, "page_size", 20).clamp(1, 100);
    let mut days_back = arg_usize(args, "days_back", 30) as i64;
    let mut offset = 0;

    if let Some(state) = cursor_from_args(args) {
        offset = cursor_offset(&state);
        if let Some(echoed) = state.get("days_back").and_then(Value::as_i64) {
            days_back = echoed;
        }
    }

    let end = Utc::now().date_naive();
    let start = end - chrono::Duration::days(days_back);
    let activities = api.activities_by_date(start, end).await?;
    let running = filter_running(activities);

    let page: Vec<Value> = running.into_iter().skip(offset).take(page_size).collect();

    let mut next_state = CursorState::new();
    next_state.insert("offset".to_owned(), json!(offset + page_size));
    next_state.insert("days_back".to_owned(), json!(days_back));

    Ok(Value::Object(build_page(page, Some(next_state), page_size, None)))
}

/// Subtract `back` calendar months from (year, month)
fn month_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - back as i32;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// Monthly running trends over a window, one cursor page of months at a
/// time. The newest month comes first, matching the activity listing.
pub async fn get_running_trends(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let page_size = arg_usize(args, "page_size", 6).clamp(1, 24);
    let mut months_back = arg_usize(args, "months_back", 6).clamp(1, 36) as u32;
    let mut offset = 0;

    if let Some(state) = cursor_from_args(args) {
        offset = cursor_offset(&state);
        if let Some(echoed) = state.get("months_back").and_then(Value::as_u64) {
            months_back = (echoed as u32).clamp(1, 36);
        }
    }

    let now = Utc::now().date_naive();
    let (start_year, start_month) = month_back(now.year(), now.month(), months_back - 1);
    let start = NaiveDate::from_ymd_opt(start_year, start_month, 1).unwrap_or(now);

    let activities = api.activities_by_date(start, now).await?;
    let running = filter_running(activities);

    let mut monthly: Vec<Value> = Vec::with_capacity(months_back as usize);
    for i in 0..months_back {
        let (year, month) = month_back(now.year(), now.month(), i);
        let prefix = format!("{year}-{month:02}");

        let month_activities: Vec<&Value> = running
            .iter()
            .filter(|a| {
                a.get("startTimeLocal")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.starts_with(&prefix))
            })
            .collect();

        let count = month_activities.len();
        let total_distance_m: f64 = month_activities
            .iter()
            .filter_map(|a| a.get("distance").and_then(Value::as_f64))
            .sum();
        let avg_pace_mps = if count > 0 {
            month_activities
                .iter()
                .filter_map(|a| a.get("averageSpeed").and_then(Value::as_f64))
                .sum::<f64>()
                / count as f64
        } else {
            0.0
        };
        let avg_distance_km = if count > 0 {
            total_distance_m / count as f64 / 1000.0
        } else {
            0.0
        };

        monthly.push(json!({
            "month": prefix,
            "activity_count": count,
            "avg_distance_km": round2(avg_distance_km),
            "avg_pace_mps": round2(avg_pace_mps),
            "total_distance_km": round2(total_distance_m / 1000.0),
        }));
    }

    // Overall trend compares the newest two months against the oldest two,
    // over the whole window regardless of which page is being served.
    let distance_of = |v: &Value| v["total_distance_km"].as_f64().unwrap_or(0.0);
    let overall_trends = if monthly.len() >= 2 {
        let recent: f64 = monthly.iter().take(2).map(distance_of).sum::<f64>() / 2.0;
        let earlier: f64 = monthly.iter().rev().take(2).map(distance_of).sum::<f64>() / 2.0;
        json!({
            "distance_trend": if recent > earlier { "increasing" } else { "decreasing" },
            "consistency": if running.len() > (months_back as usize) * 4 { "regular" } else { "irregular" },
        })
    } else {
        json!({ "distance_trend": "insufficient_data" })
    };

    let page: Vec<Value> = monthly.into_iter().skip(offset).take(page_size).collect();

    let mut next_state = CursorState::new();
    next_state.insert("offset".to_owned(), json!(offset + page_size));
    next_state.insert("months_back".to_owned(), json!(months_back));

    let mut envelope = build_page(page, Some(next_state), page_size, None);
    envelope.insert("analysis_period".to_owned(), json!(format!("{months_back} months")));
    envelope.insert("overall_trends".to_owned(), overall_trends);
    Ok(Value::Object(envelope))
}

// ── Single-activity tools ───────────────────────────────────────────────

/// Key metrics for one activity, with units converted for reading
pub async fn get_activity_summary(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let activity_id = required_u64(args, "activity_id")?;
    let activity = api.activity(activity_id).await?;

    let distance_km = activity
        .get("distance")
        .and_then(Value::as_f64)
        .map_or(0.0, |m| round2(m / 1000.0));
    let avg_speed_kmh = activity
        .get("averageSpeed")
        .and_then(Value::as_f64)
        .map_or(0.0, |mps| round2(mps * 3.6));
    let avg_pace = activity
        .get("averageSpeed")
        .and_then(Value::as_f64)
        .map_or_else(|| "N/A".to_owned(), meters_per_second_to_pace);

    Ok(json!({
        "activity_id": activity_id,
        "activity_name": activity.get("activityName"),
        "activity_type": activity.get("activityType").and_then(|t| t.get("typeKey")),
        "start_time": activity.get("startTimeLocal"),
        "distance_km": distance_km,
        "duration_seconds": activity.get("duration"),
        "average_pace_per_km": avg_pace,
        "average_speed_kmh": avg_speed_kmh,
        "elevation_gain_m": activity.get("elevationGain"),
        "elevation_loss_m": activity.get("elevationLoss"),
        "calories": activity.get("calories"),
        "average_hr": activity.get("averageHR"),
        "max_hr": activity.get("maxHR"),
        "training_effect": {
            "aerobic": activity.get("aerobicTrainingEffect"),
            "anaerobic": activity.get("anaerobicTrainingEffect"),
        },
    }))
}

/// Full detail payload for one activity. The heavy raw sections keep their
/// upstream names (`detailed_metrics`, splits inside it, GPS streams), so
/// an oversized result is exactly what the size guard knows how to divert.
pub async fn get_activity_details(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let activity_id = required_u64(args, "activity_id")?;

    let details = api.activity_details(activity_id).await?;
    let splits = absorb(api.activity_splits(activity_id).await, "splits");
    let weather = absorb(api.activity_weather(activity_id).await, "weather");

    let summary = details.get("summaryDTO").cloned().unwrap_or(Value::Null);
    let gps_available = details
        .get("metricDescriptors")
        .and_then(Value::as_array)
        .is_some_and(|descriptors| !descriptors.is_empty());

    Ok(json!({
        "activity_id": activity_id,
        "detailed_metrics": details,
        "splits": splits,
        "weather": weather,
        "performance_metrics": {
            "normalized_power": summary.get("normalizedPower"),
            "training_stress_score": summary.get("trainingStressScore"),
            "intensity_factor": summary.get("intensityFactor"),
            "stamina": summary.get("stamina"),
            "estimated_race_predictor": summary.get("estimatedRacePredictor"),
        },
        "gps_data_available": gps_available,
        "note": "Use get_heart_rate_metrics for heart rate zone configuration",
    }))
}

// ── Account-level metrics ───────────────────────────────────────────────

/// Personal bests for the standard running distances
pub async fn get_personal_records(api: &dyn GarminApi, _args: &ToolArgs) -> AppResult<Value> {
    let records = api.personal_records().await?;

    let mut formatted = Map::new();
    if let Some(list) = records.as_array() {
        for record in list {
            let type_id = record.get("typeId").and_then(Value::as_u64);
            let Some(label) = type_id
                .and_then(|id| DISTANCE_TYPE_IDS.iter().find(|(t, _)| *t == id))
                .map(|(_, label)| *label)
            else {
                continue;
            };
            let Some(seconds) = record.get("value").and_then(Value::as_f64) else {
                continue;
            };
            formatted.insert(
                label.to_owned(),
                json!({
                    "time": format_time(Some(seconds)),
                    "seconds": seconds,
                    "date": record
                        .get("activityStartDateTimeLocalFormatted")
                        .or_else(|| record.get("prStartTimeLocalFormatted")),
                    "activity_id": record.get("activityId"),
                }),
            );
        }
    }

    if formatted.is_empty() {
        return Ok(json!({
            "personal_records": {
                "note": "No personal records found. Records will be created as you complete activities.",
                "raw_data": records,
            }
        }));
    }
    Ok(json!({ "personal_records": formatted }))
}

fn extract_vo2max(max_metrics: &Value) -> (Option<f64>, Value) {
    let mut value = None;
    let mut trend = Value::Null;
    if let Some(list) = max_metrics.as_array() {
        for metric in list {
            if let Some(max_met) = metric
                .get("generic")
                .and_then(|g| g.get("maxMet"))
                .and_then(Value::as_f64)
            {
                value = Some(max_met);
                if let Some(t) = metric.get("fitnessTrendData") {
                    trend = t.clone();
                }
                break;
            }
        }
    }
    (value, trend)
}

/// VO2 Max for a day, with trend and race predictions for context
pub async fn get_vo2max(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let max_metrics = api.max_metrics(date).await?;
    let (vo2_max, vo2_max_trend) = extract_vo2max(&max_metrics);
    let race_predictions = absorb(api.race_predictions().await, "race_predictions");

    Ok(json!({
        "vo2_max": vo2_max,
        "vo2_max_trend": vo2_max_trend,
        "race_predictions": race_predictions,
        "date": date.format("%Y-%m-%d").to_string(),
        "raw_data": max_metrics,
    }))
}

/// Training status summary with readiness context
pub async fn get_training_status(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let status = api.training_status(date).await?;
    let readiness = absorb(api.training_readiness(date).await, "training_readiness");

    let status_summary = if status.is_object() {
        json!({
            "status": status.get("trainingStatusType").cloned().unwrap_or(json!("Unknown")),
            "fitness_level": status.get("fitnessLevel"),
            "load_balance": status.get("loadBalance"),
            "recovery_time": status.get("recoveryTime"),
            "training_effect": {
                "aerobic": status.get("lastWorkoutAerobicTrainingEffect"),
                "anaerobic": status.get("lastWorkoutAnaerobicTrainingEffect"),
            },
        })
    } else {
        json!({})
    };

    Ok(json!({
        "training_status": status_summary,
        "training_readiness": readiness,
        "date": date.format("%Y-%m-%d").to_string(),
        "raw_training_status": status,
        "raw_training_readiness": readiness,
    }))
}

fn readiness_summary(entry: &Value) -> Value {
    json!({
        "score": entry.get("score"),
        "level": entry.get("level"),
        "message": entry.get("message"),
        "recovery_level": entry.get("recoveryLevel"),
        "training_load_balance": entry.get("trainingLoadBalance"),
        "sleep_quality": entry.get("sleepQuality"),
        "hrv_status": entry.get("hrvStatus"),
    })
}

/// Training readiness score with recovery time context
pub async fn get_training_readiness(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let readiness = api.training_readiness(date).await?;

    // The endpoint returns either a list of readings or a single object.
    let summary = match &readiness {
        Value::Array(list) => list.last().map(readiness_summary),
        Value::Object(_) => Some(readiness_summary(&readiness)),
        _ => None,
    };
    let summary = summary.unwrap_or_else(|| {
        json!({
            "note": "No training readiness data available. This feature requires a compatible Garmin device."
        })
    });

    let recovery_time = absorb(api.training_status(date).await, "training_status")
        .get("recoveryTime")
        .cloned()
        .unwrap_or(Value::Null);

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "training_readiness": summary,
        "recovery_time_hours": recovery_time,
        "raw_readiness_data": readiness,
    }))
}

/// Resting heart rate, HR zone configuration, and HRV if present
pub async fn get_heart_rate_metrics(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let rhr_data = api.resting_heart_rate(date).await?;

    let rhr_value = rhr_data
        .get("allMetrics")
        .and_then(|m| m.get("metricsMap"))
        .and_then(|m| m.get("WELLNESS_RESTING_HEART_RATE"))
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(|entry| entry.get("value"))
        .cloned()
        .unwrap_or(Value::Null);

    let hr_zones = absorb(api.heart_rate_zones().await, "heart_rate_zones");

    // HRV rides along inside the stress stream when the device reports it.
    let hrv = absorb(api.stress_data(date).await, "stress_data")
        .as_array()
        .and_then(|entries| entries.iter().find_map(|e| e.get("hrv").cloned()))
        .unwrap_or(Value::Null);

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "resting_heart_rate": rhr_value,
        "heart_rate_zones": hr_zones,
        "hrv": hrv,
        "rhr_raw_data": rhr_data,
    }))
}

/// Sleep stages and quality for one night
pub async fn get_sleep_analysis(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let sleep = api.sleep_data(date).await?;

    let sleep_summary = if sleep.is_object() {
        let total_hours = sleep
            .get("sleepTimeSeconds")
            .and_then(Value::as_f64)
            .map_or(0.0, |secs| round2(secs / 3600.0));
        json!({
            "total_sleep_hours": total_hours,
            "sleep_start": sleep.get("sleepStartTimestampLocal"),
            "sleep_end": sleep.get("sleepEndTimestampLocal"),
            "sleep_levels": {
                "deep": sleep.get("deepSleepSeconds").cloned().unwrap_or(json!(0)),
                "light": sleep.get("lightSleepSeconds").cloned().unwrap_or(json!(0)),
                "rem": sleep.get("remSleepSeconds").cloned().unwrap_or(json!(0)),
                "awake": sleep.get("awakeSleepSeconds").cloned().unwrap_or(json!(0)),
            },
            "sleep_score": sleep.get("sleepScore"),
            "sleep_quality": sleep.get("sleepQuality"),
        })
    } else {
        json!({})
    };

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "sleep_summary": sleep_summary,
        "raw_sleep_data": sleep,
    }))
}

/// Body battery level and timeline for a day
pub async fn get_body_battery(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let battery = api.body_battery(date).await?;

    let battery_summary = battery
        .as_array()
        .and_then(|readings| readings.last())
        .map_or_else(
            || json!({}),
            |latest| {
                json!({
                    "current_level": latest.get("level"),
                    "charged_value": latest.get("charged"),
                    "drained_value": latest.get("drained"),
                })
            },
        );

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "body_battery_summary": battery_summary,
        "body_battery_timeline": battery,
    }))
}

/// Stress summary statistics and timeline for a day
pub async fn get_stress_levels(api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let date = arg_date(args)?;
    let stress = api.stress_data(date).await?;

    let values: Vec<f64> = stress
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("value").and_then(Value::as_f64))
                .filter(|v| *v > 0.0)
                .collect()
        })
        .unwrap_or_default();

    let stress_summary = if values.is_empty() {
        json!({})
    } else {
        let sum: f64 = values.iter().sum();
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        json!({
            "average_stress": (sum / values.len() as f64 * 10.0).round() / 10.0,
            "max_stress": max,
            "min_stress": min,
            "current_stress": values.last(),
        })
    };

    Ok(json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "stress_summary": stress_summary,
        "stress_timeline": stress,
    }))
}

/// Garmin's predicted race times for the common distances
pub async fn get_race_predictions(api: &dyn GarminApi, _args: &ToolArgs) -> AppResult<Value> {
    let predictions = api.race_predictions().await?;

    // Prediction distances come back in meters, including the fractional
    // half-marathon distance.
    const DISTANCE_LABELS: &[(f64, &str)] = &[
        (5_000.0, "5K"),
        (10_000.0, "10K"),
        (21_097.5, "half_marathon"),
        (42_195.0, "marathon"),
    ];

    let mut formatted = Map::new();
    if let Some(list) = predictions.as_array() {
        for prediction in list {
            let Some(distance) = prediction.get("distance").and_then(Value::as_f64) else {
                continue;
            };
            let Some(label) = DISTANCE_LABELS
                .iter()
                .find(|(m, _)| (m - distance).abs() < 0.5)
                .map(|(_, label)| *label)
            else {
                continue;
            };
            let Some(seconds) = prediction.get("time").and_then(Value::as_f64) else {
                continue;
            };
            formatted.insert(
                label.to_owned(),
                json!({
                    "predicted_time": format_time(Some(seconds)),
                    "predicted_seconds": seconds,
                    "race_readiness_level": prediction.get("raceReadinessLevel"),
                    "race_readiness_state": prediction.get("raceReadinessState"),
                }),
            );
        }
    }

    let vo2_max = absorb(api.max_metrics(Utc::now().date_naive()).await, "max_metrics");
    let (vo2_max, _) = extract_vo2max(&vo2_max);

    let race_predictions = if formatted.is_empty() {
        json!({
            "note": "No race predictions available. This requires recent running activities and a compatible Garmin device."
        })
    } else {
        Value::Object(formatted)
    };

    Ok(json!({
        "race_predictions": race_predictions,
        "current_vo2_max": vo2_max,
        "raw_predictions": predictions,
    }))
}

// ── Pure calculation tools ──────────────────────────────────────────────

fn parse_race_input(args: &ToolArgs) -> AppResult<(String, String, u32, u32)> {
    let distance = required_str(args, "race_distance")?.to_owned();
    let time = required_str(args, "race_time")?.to_owned();
    let total_seconds = parse_time(&time)?;
    let distance_meters = race_distance_meters(&distance)?;
    Ok((distance, time, distance_meters, total_seconds))
}

/// Training paces from a recent race result, as fixed percentages of race pace
pub async fn calculate_training_paces(
    _api: &dyn GarminApi,
    args: &ToolArgs,
) -> AppResult<Value> {
    let (distance, time, distance_meters, total_seconds) = parse_race_input(args)?;
    let pace_per_km = f64::from(total_seconds) / (f64::from(distance_meters) / 1000.0);

    const FACTORS: &[(&str, f64)] = &[
        ("easy_pace", 1.20),
        ("marathon_pace", 1.05),
        ("threshold_pace", 0.95),
        ("interval_pace", 0.90),
        ("repetition_pace", 0.85),
    ];

    let mut paces = Map::new();
    for (name, factor) in FACTORS {
        paces.insert(
            (*name).to_owned(),
            json!(format_pace(Some(pace_per_km * factor))),
        );
    }

    Ok(json!({
        "race_performance": {
            "distance": distance,
            "time": time,
            "pace_per_km": format_pace(Some(pace_per_km)),
        },
        "training_paces": paces,
    }))
}

/// VDOT estimate from a race result, with Daniels training zones and
/// equivalent race times
pub async fn calculate_vdot_zones(_api: &dyn GarminApi, args: &ToolArgs) -> AppResult<Value> {
    let (distance, time, distance_meters, total_seconds) = parse_race_input(args)?;
    let vdot = vdot_from_time(distance_meters, total_seconds);
    let pace_per_km = f64::from(total_seconds) / (f64::from(distance_meters) / 1000.0);

    Ok(json!({
        "vdot": vdot,
        "race_input": {
            "distance": distance,
            "time": time,
            "pace_per_km": format_pace(Some(pace_per_km)),
        },
        "training_zones": training_paces_from_vdot(vdot),
        "equivalent_race_times": equivalent_race_times(vdot),
        "training_recommendations": {
            "easy_runs": "60-70% of weekly mileage at easy pace",
            "quality_workouts": "2-3 per week at threshold/interval pace",
            "long_runs": "20-25% of weekly mileage at easy to marathon pace",
        },
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_month_back_wraps_years() {
        assert_eq!(month_back(2026, 8, 0), (2026, 8));
        assert_eq!(month_back(2026, 8, 7), (2026, 1));
        assert_eq!(month_back(2026, 8, 8), (2025, 12));
        assert_eq!(month_back(2026, 1, 13), (2024, 12));
    }

    #[test]
    fn test_running_filter() {
        let run = json!({"activityType": {"typeKey": "trail_running"}});
        let ride = json!({"activityType": {"typeKey": "cycling"}});
        let untyped = json!({"activityName": "mystery"});
        let kept = filter_running(vec![run.clone(), ride, untyped]);
        assert_eq!(kept, vec![run]);
    }
}
