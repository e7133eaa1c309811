//! Match event drafts stamped with the match clock
//!
//! The event log lives on the REST backend. This module only builds the
//! bodies to submit: new events carrying the chosen action, an optional
//! event type, and the `delay` taken from the live timer or from the video
//! position, plus delay corrections for events already logged.

use serde::{Deserialize, Serialize};

/// Seconds subtracted from a video position when tagging, to account for
/// the analyst reacting after the moment happened
pub const VIDEO_REACTION_OFFSET_SECS: u64 = 7;

/// Which side of the match an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

/// Typed live-screen events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SubstitutionHome,
    SubstitutionAway,
    YellowCardHome,
    YellowCardAway,
    RedCardHome,
    RedCardAway,
    GoalHome,
    GoalAway,
    CornerHome,
    CornerAway,
}

impl EventKind {
    pub fn side(&self) -> Side {
        match self {
            EventKind::SubstitutionHome
            | EventKind::YellowCardHome
            | EventKind::RedCardHome
            | EventKind::GoalHome
            | EventKind::CornerHome => Side::Home,
            _ => Side::Away,
        }
    }

    /// Button label without the side
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::SubstitutionHome | EventKind::SubstitutionAway => "Substitution",
            EventKind::YellowCardHome | EventKind::YellowCardAway => "Yellow Card",
            EventKind::RedCardHome | EventKind::RedCardAway => "Red Card",
            EventKind::GoalHome | EventKind::GoalAway => "Goal",
            EventKind::CornerHome | EventKind::CornerAway => "Corner",
        }
    }

    /// Label with the side, e.g. `Goal (home)`
    pub fn describe(&self) -> String {
        let side = match self.side() {
            Side::Home => "home",
            Side::Away => "away",
        };
        format!("{} ({})", self.label(), side)
    }
}

/// Request to record an event for a match
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    /// Backend id of the action the event is filed under
    pub action: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<EventKind>,
    /// Video position in seconds when tagging from a recording
    #[serde(default)]
    pub video_timestamp: Option<f64>,
}

/// Body submitted to the backend's event endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(rename = "match")]
    pub match_id: u64,
    pub action: u64,
    pub delay: u64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
}

/// `elapsed - offset`, floored at zero
pub fn stamp_delay(elapsed: u64, offset: u64) -> u64 {
    elapsed.saturating_sub(offset)
}

/// Backend match ids are plain decimal digits
pub fn parse_backend_match_id(match_id: &str) -> Result<u64, String> {
    if match_id.is_empty() || !match_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Match id is not numeric: {}", match_id));
    }
    match_id
        .parse::<u64>()
        .map_err(|e| format!("Match id {} is out of range: {}", match_id, e))
}

/// Build the draft for `request`, using `elapsed` unless a video position
/// was given
pub fn build_draft(match_id: &str, elapsed: u64, request: &EventRequest) -> Result<EventDraft, String> {
    let match_id = parse_backend_match_id(match_id)?;

    let delay = match request.video_timestamp {
        Some(ts) if !ts.is_finite() || ts < 0.0 => {
            return Err(format!("Invalid video timestamp: {}", ts));
        }
        Some(ts) => stamp_delay(ts.floor() as u64, VIDEO_REACTION_OFFSET_SECS),
        None => elapsed,
    };

    Ok(EventDraft {
        match_id,
        action: request.action,
        delay,
        kind: request.kind,
    })
}

/// An event already logged on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub id: u64,
    pub delay: u64,
}

/// `delay + adjustment`, floored at zero
pub fn adjust_delay(delay: u64, adjustment: i64) -> u64 {
    if adjustment >= 0 {
        delay.saturating_add(adjustment as u64)
    } else {
        delay.saturating_sub(adjustment.unsigned_abs())
    }
}

/// Body for correcting a single event's delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayPatch {
    pub id: u64,
    pub delay: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayUpdate {
    pub delay: u64,
}

/// Body for setting the delay of many events at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDelayPatch {
    pub ids: Vec<u64>,
    pub update: DelayUpdate,
}

/// Shift one logged event by `adjustment` seconds
pub fn adjust_event(event: &LoggedEvent, adjustment: i64) -> DelayPatch {
    DelayPatch {
        id: event.id,
        delay: adjust_delay(event.delay, adjustment),
    }
}

/// Bulk correction: the first event's adjusted delay becomes the delay of
/// every listed event. `None` when there are no events.
pub fn adjust_all(events: &[LoggedEvent], adjustment: i64) -> Option<BulkDelayPatch> {
    let base = events.first()?;
    Some(BulkDelayPatch {
        ids: events.iter().map(|event| event.id).collect(),
        update: DelayUpdate {
            delay: adjust_delay(base.delay, adjustment),
        },
    })
}
