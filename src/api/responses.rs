//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    events::{BulkDelayPatch, DelayPatch, EventDraft, LoggedEvent},
    timer::TimerSnapshot,
    video::{MarkerLayout, VideoMarker},
};

/// Response for timer reads and transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Describe `timer` by whether it is advancing
    pub fn for_state(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.running { "running" } else { "paused" };
        Self::new(status.to_string(), message, timer)
    }
}

/// Response carrying an event body ready for the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub timestamp: DateTime<Utc>,
    pub formatted_delay: String,
    /// Human-readable event type, absent for generic events
    pub label: Option<String>,
    pub event: EventDraft,
}

/// Request body for correcting logged event delays
#[derive(Debug, Clone, Deserialize)]
pub struct DelayAdjustmentRequest {
    /// Signed seconds to shift by
    pub adjustment: i64,
    /// The match's events in backend order
    #[serde(default)]
    pub events: Vec<LoggedEvent>,
    /// Adjust only this event instead of all of them
    #[serde(default)]
    pub event_id: Option<u64>,
}

/// Patch body to send to the backend, by adjustment mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DelayAdjustmentResponse {
    Single { patch: DelayPatch },
    Bulk { patch: BulkDelayPatch },
}

/// Request body for laying out video markers
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerLayoutRequest {
    pub duration: f64,
    #[serde(default)]
    pub markers: Vec<VideoMarker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerLayoutResponse {
    pub duration: f64,
    pub markers: Vec<MarkerLayout>,
}

/// Error body returned alongside a failure status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Server status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running_matches: Vec<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub refresh_interval_ms: u64,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
