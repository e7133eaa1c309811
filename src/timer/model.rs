//! Timer state structure and elapsed-time arithmetic

use serde::{Deserialize, Serialize};

/// Persisted timer state for one match.
///
/// Only the three time fields are serialized; the match id is the
/// partition key of the store and is filled in on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(skip)]
    pub match_id: String,
    /// Seconds counted while previously running, excluding the current run
    pub accumulated_seconds: u64,
    pub running: bool,
    /// Wall-clock millis of the last transition to running
    #[serde(default)]
    pub last_resume_epoch_millis: i64,
}

impl TimerState {
    /// Create a fresh, paused timer at zero
    pub fn new(match_id: impl Into<String>) -> Self {
        Self {
            match_id: match_id.into(),
            accumulated_seconds: 0,
            running: false,
            last_resume_epoch_millis: 0,
        }
    }

    /// Elapsed seconds as seen at `now`
    pub fn elapsed(&self, now: i64) -> u64 {
        current_elapsed(self, now)
    }
}

/// Externally-visible elapsed seconds at `now`.
///
/// A paused timer reports exactly its accumulated seconds. A running timer
/// adds the whole seconds since the last resume, floored. If the clock went
/// backwards past the resume point the running part is negative and the
/// result saturates at zero.
pub fn current_elapsed(state: &TimerState, now: i64) -> u64 {
    if !state.running {
        return state.accumulated_seconds;
    }

    let running_secs = now
        .saturating_sub(state.last_resume_epoch_millis)
        .div_euclid(1000);

    if running_secs >= 0 {
        state.accumulated_seconds.saturating_add(running_secs as u64)
    } else {
        state
            .accumulated_seconds
            .saturating_sub(running_secs.unsigned_abs())
    }
}

/// Start a paused timer or pause a running one
pub fn toggle(state: &TimerState, now: i64) -> TimerState {
    if state.running {
        TimerState {
            match_id: state.match_id.clone(),
            accumulated_seconds: current_elapsed(state, now),
            running: false,
            last_resume_epoch_millis: state.last_resume_epoch_millis,
        }
    } else {
        TimerState {
            match_id: state.match_id.clone(),
            accumulated_seconds: state.accumulated_seconds,
            running: true,
            last_resume_epoch_millis: now,
        }
    }
}

/// Back to a paused zero, dropping any in-flight run
pub fn reset(state: &TimerState) -> TimerState {
    TimerState::new(state.match_id.clone())
}

/// Render seconds as `MM:SS`; minutes do not roll over into hours
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Reject ids that cannot serve as a storage partition key
pub fn validate_match_id(match_id: &str) -> Result<(), String> {
    if match_id.is_empty() {
        return Err("Match id must not be empty".to_string());
    }
    if match_id.len() > 128 {
        return Err(format!("Match id is too long: {} chars", match_id.len()));
    }
    if !match_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("Match id contains invalid characters: {}", match_id));
    }
    Ok(())
}

/// Point-in-time view of a timer, as shown on the live screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub match_id: String,
    pub elapsed_seconds: u64,
    pub formatted: String,
    pub running: bool,
}

impl TimerSnapshot {
    /// Snapshot `state` as of `now`
    pub fn at(state: &TimerState, now: i64) -> Self {
        let elapsed_seconds = current_elapsed(state, now);
        Self {
            match_id: state.match_id.clone(),
            elapsed_seconds,
            formatted: format_elapsed(elapsed_seconds),
            running: state.running,
        }
    }
}
