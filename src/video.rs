//! Video marker overlay geometry

use serde::{Deserialize, Serialize};

/// A tagged moment in a match recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMarker {
    /// Seconds from the start of the video
    pub timestamp: f64,
    /// Creation date reported by the backend, passed through untouched
    #[serde(default)]
    pub date: Option<String>,
}

/// Where and how a marker is drawn on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayout {
    pub timestamp: f64,
    /// Horizontal offset along the timeline; `None` until the duration is known
    pub position_percent: Option<f64>,
    pub label: String,
    pub date: Option<String>,
}

/// Offset of `timestamp` along a timeline of `duration` seconds, in percent
pub fn marker_position_percent(timestamp: f64, duration: f64) -> Option<f64> {
    if !duration.is_finite() || duration <= 0.0 || !timestamp.is_finite() {
        return None;
    }
    Some((timestamp / duration * 100.0).clamp(0.0, 100.0))
}

/// `HH:MM:SS` tooltip label for a marker
pub fn marker_label(timestamp: f64) -> String {
    let total = if timestamp.is_finite() && timestamp > 0.0 {
        timestamp.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

pub fn layout_markers(duration: f64, markers: &[VideoMarker]) -> Vec<MarkerLayout> {
    markers
        .iter()
        .map(|marker| MarkerLayout {
            timestamp: marker.timestamp,
            position_percent: marker_position_percent(marker.timestamp, duration),
            label: marker_label(marker.timestamp),
            date: marker.date.clone(),
        })
        .collect()
}
