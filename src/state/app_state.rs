//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    events::{self, EventDraft, EventRequest},
    timer::{MatchTimers, TimerSnapshot},
};

/// Main application state shared by the handlers and background tasks
pub struct AppState {
    /// Per-match timers backed by the persistent store
    pub timers: MatchTimers,
    /// How often running timers are re-derived for display
    pub refresh_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest displayed timer value
    pub snapshot_tx: watch::Sender<Option<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Option<TimerSnapshot>>,
}

impl AppState {
    pub fn new(port: u16, host: String, refresh_interval: Duration, timers: MatchTimers) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);

        Self {
            timers,
            refresh_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Start or pause a match timer and publish the result
    pub fn toggle_timer(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        let snapshot = self.timers.toggle(match_id)?;
        info!("Timer for match {} {} at {}", match_id,
              if snapshot.running { "started" } else { "paused" }, snapshot.formatted);

        self.record_action(if snapshot.running { "timer-start" } else { "timer-pause" }, match_id);
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Reset a match timer and publish the result
    pub fn reset_timer(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        let snapshot = self.timers.reset(match_id)?;
        info!("Timer for match {} reset", match_id);

        self.record_action("timer-reset", match_id);
        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    pub fn timer_snapshot(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        self.timers.snapshot(match_id)
    }

    /// Draft an event for `match_id` stamped with the current match clock
    pub fn draft_event(&self, match_id: &str, request: &EventRequest) -> Result<EventDraft, String> {
        let elapsed = self.timers.elapsed(match_id)?;
        let draft = events::build_draft(match_id, elapsed, request)?;
        info!("Event drafted for match {}: action={}, delay={}s", match_id, draft.action, draft.delay);

        self.record_action("event", match_id);
        Ok(draft)
    }

    pub fn running_matches(&self) -> Vec<String> {
        self.timers.running_matches()
    }

    /// Send a snapshot to display subscribers
    pub fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(Some(snapshot)) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TimerSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    fn record_action(&self, action: &str, match_id: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(format!("{} {}", action, match_id));
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
