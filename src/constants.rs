// ABOUTME: Application constants and configuration defaults
// ABOUTME: Response limits, cache durations, heavy-field patterns, and Garmin endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 garmin-mcp-server contributors

/// Server name advertised during MCP initialization
pub const SERVER_NAME: &str = "garmin-connect-mcp";

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP protocol version supported by this server
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Response size limits
pub mod limits {
    /// Maximum serialized size of a single tool response (bytes)
    pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 800_000;

    /// Per-field diversion threshold (bytes). Must stay well below the
    /// response ceiling so diverting a few large fields clears the budget.
    pub const DEFAULT_FIELD_THRESHOLD_BYTES: usize = 50_000;

    /// Default time-to-live for diverted overflow data
    pub const DEFAULT_OVERFLOW_TTL_SECS: u64 = 3_600;

    /// Interval between background sweeps of expired overflow entries
    pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

    /// Upper bound on cached tool responses
    pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 512;
}

/// Field name fragments that mark a field as a diversion candidate.
/// Matching is case-insensitive substring; the size threshold must also
/// be exceeded before a field is actually diverted.
pub const LARGE_FIELD_PATTERNS: &[&str] = &[
    "raw_",
    "full_",
    "detailed_",
    "complete_",
    "gps_",
    "chart_",
    "activity_details",
    "metric_descriptors",
    "activity_detail_metrics",
];

/// URI scheme for overflow resources
pub const OVERFLOW_URI_SCHEME: &str = "overflow";

/// Activity type keys Garmin uses for running workouts
pub const RUNNING_ACTIVITY_TYPES: &[&str] = &[
    "running",
    "track_running",
    "trail_running",
    "treadmill_running",
];

/// Race distances in meters, keyed by the distance labels tools accept
pub const DISTANCE_METERS: &[(&str, u32)] = &[
    ("5K", 5_000),
    ("10K", 10_000),
    ("half_marathon", 21_097),
    ("marathon", 42_195),
];

/// Garmin personal-record typeId to distance label mapping
pub const DISTANCE_TYPE_IDS: &[(u64, &str)] = &[
    (3, "5K"),
    (4, "10K"),
    (5, "half_marathon"),
    (6, "marathon"),
];

/// Response cache durations per data type, in hours. Mirrors how quickly
/// each metric actually changes upstream.
pub mod cache_durations {
    /// (cache kind, duration in hours)
    pub const TABLE: &[(&str, f64)] = &[
        // Static data - changes rarely
        ("personal_records", 24.0),
        ("race_predictions", 12.0),
        // Semi-dynamic data - changes daily
        ("vo2max", 6.0),
        ("training_status", 1.0),
        ("training_readiness", 1.0),
        // Dynamic data - changes frequently
        ("heart_rate", 0.25),
        ("stress", 0.25),
        ("body_battery", 0.5),
        // Activity data
        ("activities", 0.5),
        ("activity_details", 24.0),
        // Health metrics
        ("sleep", 2.0),
    ];

    /// Fallback when a kind has no entry
    pub const DEFAULT_HOURS: f64 = 1.0;
}

/// Environment variable names consumed by `ServerConfig::from_env`
pub mod env_names {
    pub const GARMIN_USERNAME: &str = "GARMIN_USERNAME";
    pub const GARMIN_PASSWORD: &str = "GARMIN_PASSWORD";
    pub const GARMIN_TOKEN_DIR: &str = "GARMIN_TOKEN_DIR";
    pub const GARMIN_API_BASE_URL: &str = "GARMIN_API_BASE_URL";
    pub const MAX_RESPONSE_BYTES: &str = "MAX_RESPONSE_BYTES";
    pub const OVERFLOW_FIELD_THRESHOLD_BYTES: &str = "OVERFLOW_FIELD_THRESHOLD_BYTES";
    pub const OVERFLOW_TTL_SECS: &str = "OVERFLOW_TTL_SECS";
    pub const OVERFLOW_SWEEP_INTERVAL_SECS: &str = "OVERFLOW_SWEEP_INTERVAL_SECS";
}

/// Garmin Connect API endpoints, relative to the API base URL
pub mod endpoints {
    pub const ACTIVITIES_BY_DATE: &str = "/activitylist-service/activities/search/activities";
    pub const ACTIVITY: &str = "/activity-service/activity";
    pub const PERSONAL_RECORDS: &str = "/personalrecord-service/personalrecord/prs";
    pub const MAX_METRICS: &str = "/metrics-service/metrics/maxmet/daily";
    pub const TRAINING_STATUS: &str = "/metrics-service/metrics/trainingstatus/aggregated";
    pub const TRAINING_READINESS: &str = "/metrics-service/metrics/trainingreadiness";
    pub const RACE_PREDICTIONS: &str = "/metrics-service/metrics/racepredictions/latest";
    pub const DAILY_RHR: &str = "/wellness-service/wellness/dailyHeartRate";
    pub const HEART_RATE_ZONES: &str = "/biometric-service/heartRateZones";
    pub const DAILY_SLEEP: &str = "/wellness-service/wellness/dailySleepData";
    pub const BODY_BATTERY: &str = "/wellness-service/wellness/bodyBattery/reports/daily";
    pub const DAILY_STRESS: &str = "/wellness-service/wellness/dailyStress";
    pub const OAUTH_EXCHANGE: &str = "/oauth-service/oauth/exchange/user/2.0";
    pub const DEFAULT_API_BASE_URL: &str = "https://connectapi.garmin.com";
}
