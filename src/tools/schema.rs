// ABOUTME: MCP tool schema definitions and response content types
// ABOUTME: Declares every tool's name, description, and input schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// MCP tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Content blocks carried in a tool response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "resource")]
    Resource {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
}

/// Tool response after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolResponse {
    /// Wrap a structured result as a tool response
    #[must_use]
    pub fn from_value(value: Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_owned());
        Self {
            content: vec![Content::Text { text }],
            is_error,
            structured_content: Some(value),
        }
    }
}

/// Cache kind for a tool, driving its cache duration. `None` means the
/// tool result is never cached (paginated listings, pure calculations).
#[must_use]
pub fn cache_kind(tool_name: &str) -> Option<&'static str> {
    match tool_name {
        "get_personal_records" => Some("personal_records"),
        "get_vo2max" => Some("vo2max"),
        "get_training_status" => Some("training_status"),
        "get_training_readiness" => Some("training_readiness"),
        "get_heart_rate_metrics" => Some("heart_rate"),
        "get_sleep_analysis" => Some("sleep"),
        "get_body_battery" => Some("body_battery"),
        "get_stress_levels" => Some("stress"),
        "get_race_predictions" => Some("race_predictions"),
        "get_activity_summary" | "get_activity_details" => Some("activity_details"),
        _ => None,
    }
}

fn date_property() -> Value {
    json!({
        "type": "string",
        "description": "Date in YYYY-MM-DD format, defaults to today"
    })
}

fn cursor_property() -> Value {
    json!({
        "type": "string",
        "description": "Opaque pagination cursor from a previous response"
    })
}

fn race_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "race_distance": {
                "type": "string",
                "enum": ["5K", "10K", "half_marathon", "marathon"],
                "description": "Race distance the time was run at"
            },
            "race_time": {
                "type": "string",
                "description": "Race time in MM:SS or HH:MM:SS format"
            }
        },
        "required": ["race_distance", "race_time"]
    })
}

/// All tools this server exposes
// Long function: flat declarative list of tool schemas
#[must_use]
pub fn get_tools() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_recent_running_activities".to_owned(),
            description:
                "Get recent running activities with detailed metrics, paginated via cursor"
                    .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page_size": {
                        "type": "integer",
                        "description": "Number of activities per page",
                        "default": 20
                    },
                    "days_back": {
                        "type": "integer",
                        "description": "Number of days back to search",
                        "default": 30
                    },
                    "cursor": cursor_property()
                }
            }),
        },
        ToolSchema {
            name: "get_running_trends".to_owned(),
            description:
                "Get monthly running trends (distance, pace, volume), paginated via cursor"
                    .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "months_back": {
                        "type": "integer",
                        "description": "Number of calendar months to analyze",
                        "default": 6
                    },
                    "page_size": {
                        "type": "integer",
                        "description": "Number of months per page",
                        "default": 6
                    },
                    "cursor": cursor_property()
                }
            }),
        },
        ToolSchema {
            name: "get_activity_summary".to_owned(),
            description: "Get summary metrics for a single activity".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "activity_id": {
                        "type": "integer",
                        "description": "Garmin activity ID"
                    }
                },
                "required": ["activity_id"]
            }),
        },
        ToolSchema {
            name: "get_activity_details".to_owned(),
            description:
                "Get full activity details including splits and weather. Oversized raw data is \
                 served through overflow:// resources"
                    .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "activity_id": {
                        "type": "integer",
                        "description": "Garmin activity ID"
                    }
                },
                "required": ["activity_id"]
            }),
        },
        ToolSchema {
            name: "get_personal_records".to_owned(),
            description:
                "Get personal best times for running distances (5K, 10K, half marathon, marathon)"
                    .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolSchema {
            name: "get_vo2max".to_owned(),
            description: "Get current VO2 Max value and historical trend data".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_training_status".to_owned(),
            description:
                "Get current training status including training effect, load balance, and fitness trends"
                    .to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_training_readiness".to_owned(),
            description: "Get training readiness score and contributing factors".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_heart_rate_metrics".to_owned(),
            description: "Get resting heart rate, configured HR zones, and HRV data".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_sleep_analysis".to_owned(),
            description: "Get sleep duration, stages, and quality score for a night".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_body_battery".to_owned(),
            description: "Get body battery energy level and drain/charge timeline".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_stress_levels".to_owned(),
            description: "Get stress level summary and timeline for a day".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": { "date": date_property() }
            }),
        },
        ToolSchema {
            name: "get_race_predictions".to_owned(),
            description: "Get Garmin's predicted race times for common distances".to_owned(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolSchema {
            name: "calculate_training_paces".to_owned(),
            description:
                "Calculate training paces (easy, marathon, threshold, interval, repetition) from a recent race result"
                    .to_owned(),
            input_schema: race_input_schema(),
        },
        ToolSchema {
            name: "calculate_vdot_zones".to_owned(),
            description:
                "Calculate VDOT from a race result, with training zones and equivalent race times"
                    .to_owned(),
            input_schema: race_input_schema(),
        },
    ]
}
