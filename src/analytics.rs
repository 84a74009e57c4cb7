// ABOUTME: Pure training-science functions: pace math, VDOT, training zones
// ABOUTME: Formulas follow Jack Daniels' Running Formula approximations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

use serde_json::{json, Value};

use crate::constants::DISTANCE_METERS;
use crate::errors::{AppResult, GarminError};

/// Format seconds into `HH:MM:SS` or `MM:SS`; `None` renders as `N/A`
#[must_use]
pub fn format_time(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds else {
        return "N/A".to_owned();
    };
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Format pace from seconds per km into `M:SS`; `None` renders as `N/A`
#[must_use]
pub fn format_pace(seconds_per_km: Option<f64>) -> String {
    let Some(spk) = seconds_per_km else {
        return "N/A".to_owned();
    };
    let total = spk.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse a `MM:SS` or `HH:MM:SS` time string into seconds
///
/// # Errors
///
/// Returns `GarminError::InvalidParams` for any other shape
pub fn parse_time(time_str: &str) -> AppResult<u32> {
    let parts: Vec<&str> = time_str.split(':').collect();
    let parsed: Option<Vec<u32>> = parts.iter().map(|p| p.parse().ok()).collect();
    let fields = parsed.ok_or_else(|| invalid_time(time_str))?;

    match fields.as_slice() {
        [minutes, seconds] => Ok(minutes * 60 + seconds),
        [hours, minutes, seconds] => Ok(hours * 3600 + minutes * 60 + seconds),
        _ => Err(invalid_time(time_str)),
    }
}

fn invalid_time(time_str: &str) -> GarminError {
    GarminError::InvalidParams(format!(
        "Invalid time format: {time_str}. Use MM:SS or HH:MM:SS"
    ))
}

/// Convert speed in m/s to a pace-per-km string
#[must_use]
pub fn meters_per_second_to_pace(speed_mps: f64) -> String {
    if speed_mps <= 0.0 {
        return "N/A".to_owned();
    }
    format_pace(Some(1000.0 / speed_mps))
}

/// Look up the meter distance for a race label such as `5K` or `marathon`
///
/// # Errors
///
/// Returns `GarminError::InvalidParams` for unsupported labels
pub fn race_distance_meters(label: &str) -> AppResult<u32> {
    DISTANCE_METERS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, meters)| *meters)
        .ok_or_else(|| GarminError::InvalidParams(format!("Unsupported race distance: {label}")))
}

/// Estimate VDOT from a race distance and finish time.
///
/// Approximation of Jack Daniels' formula: oxygen cost from velocity,
/// divided by the fraction of VO2max sustainable for the race duration.
#[must_use]
pub fn vdot_from_time(distance_meters: u32, time_seconds: u32) -> f64 {
    let time_minutes = f64::from(time_seconds) / 60.0;
    let velocity = f64::from(distance_meters) / time_minutes;

    let percent_max = 0.8
        + 0.189_439_3 * (-0.012_778 * time_minutes).exp()
        + 0.298_955_8 * (-0.193_260_5 * time_minutes).exp();
    let vo2 = velocity * 0.182_258 + velocity * velocity * 0.000_104;
    let vdot = vo2 / percent_max;

    (vdot * 10.0).round() / 10.0
}

/// Training paces per zone derived from a VDOT value, with descriptions
/// and heart-rate guidance per Daniels' pace percentages.
#[must_use]
pub fn training_paces_from_vdot(vdot: f64) -> Value {
    // (zone, percent of VDOT, description, HR guidance)
    const ZONES: &[(&str, f64, &str, &str)] = &[
        (
            "marathon",
            0.84,
            "Marathon race pace",
            "80-89% of max HR",
        ),
        (
            "threshold",
            0.88,
            "Comfortably hard, sustainable for ~1 hour",
            "88-92% of max HR",
        ),
        (
            "interval",
            0.98,
            "3-5 minute intervals at 3K-5K pace",
            "95-100% of max HR",
        ),
        (
            "repetition",
            1.05,
            "Short, fast repeats for speed development",
            "Not HR based - focus on pace",
        ),
    ];
    const EASY_RANGE: (f64, f64) = (0.59, 0.74);

    let speed_at = |fraction: f64| vdot * fraction * 1000.0 / 60.0;

    let easy_low_pace = meters_per_second_to_pace(speed_at(EASY_RANGE.1));
    let easy_high_pace = meters_per_second_to_pace(speed_at(EASY_RANGE.0));

    let mut paces = serde_json::Map::new();
    paces.insert(
        "easy".to_owned(),
        json!({
            "pace_per_km": format!("{easy_low_pace}-{easy_high_pace}"),
            "description": "Conversational pace for base building",
            "heart_rate_range": "65-79% of max HR",
        }),
    );

    for (zone, fraction, description, hr_range) in ZONES {
        paces.insert(
            (*zone).to_owned(),
            json!({
                "pace_per_km": meters_per_second_to_pace(speed_at(*fraction)),
                "description": description,
                "heart_rate_range": hr_range,
            }),
        );
    }

    Value::Object(paces)
}

/// Equivalent race times at other distances for a given VDOT, from the
/// standard VDOT tables. Below VDOT 30 the tables are not meaningful.
#[must_use]
pub fn equivalent_race_times(vdot: f64) -> Value {
    const BASELINES: &[(&str, f64)] = &[
        ("5K", 1_080.0),
        ("10K", 2_250.0),
        ("half_marathon", 4_980.0),
        ("marathon", 10_440.0),
    ];

    let mut times = serde_json::Map::new();
    for (label, baseline_secs) in BASELINES {
        let rendered = if vdot >= 30.0 {
            format_time(Some(baseline_secs * (50.0 / vdot)))
        } else {
            "N/A".to_owned()
        };
        times.insert((*label).to_owned(), json!(rendered));
    }
    Value::Object(times)
}
