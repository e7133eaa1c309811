//! Per-match timer service
//!
//! Owns the timers of this process. Every transition is written through to
//! the store before it is reported; reads come from an in-memory copy that
//! is filled lazily from the store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::{debug, info};

use super::{
    clock::Clock,
    model::{self, validate_match_id, TimerSnapshot, TimerState},
    store::TimerStore,
};

pub struct MatchTimers {
    store: Arc<dyn TimerStore>,
    clock: Arc<dyn Clock>,
    timers: Mutex<HashMap<String, TimerState>>,
}

impl MatchTimers {
    pub fn new(store: Arc<dyn TimerStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Load every persisted timer, returning how many were found
    pub fn restore(&self) -> Result<usize, String> {
        let ids = self.store.match_ids()?;
        let mut timers = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?;

        for id in &ids {
            let state = self.store.load(id);
            if state.running {
                info!("Resuming running timer for match {} at {}s", id,
                      state.elapsed(self.clock.now_millis()));
            }
            timers.insert(id.clone(), state);
        }
        Ok(ids.len())
    }

    /// Current state for `match_id`, created lazily on first access
    pub fn state(&self, match_id: &str) -> Result<TimerState, String> {
        validate_match_id(match_id)?;
        let mut timers = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?;

        let state = timers
            .entry(match_id.to_string())
            .or_insert_with(|| self.store.load(match_id));
        Ok(state.clone())
    }

    /// Elapsed seconds for `match_id` right now
    pub fn elapsed(&self, match_id: &str) -> Result<u64, String> {
        Ok(self.state(match_id)?.elapsed(self.clock.now_millis()))
    }

    pub fn snapshot(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        let state = self.state(match_id)?;
        Ok(TimerSnapshot::at(&state, self.clock.now_millis()))
    }

    /// Start or pause the timer for `match_id`
    pub fn toggle(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        let now = self.clock.now_millis();
        let state = self.transition(match_id, |state| model::toggle(state, now))?;
        debug!("Toggled timer for match {}: running={}", match_id, state.running);
        Ok(TimerSnapshot::at(&state, now))
    }

    /// Reset the timer for `match_id` to a paused zero
    pub fn reset(&self, match_id: &str) -> Result<TimerSnapshot, String> {
        let state = self.transition(match_id, model::reset)?;
        debug!("Reset timer for match {}", match_id);
        Ok(TimerSnapshot::at(&state, self.clock.now_millis()))
    }

    /// Ids of timers currently advancing, sorted
    pub fn running_matches(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.timers.lock()
            .map(|timers| {
                timers.values()
                    .filter(|state| state.running)
                    .map(|state| state.match_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }

    fn transition<F>(&self, match_id: &str, apply: F) -> Result<TimerState, String>
    where
        F: FnOnce(&TimerState) -> TimerState,
    {
        validate_match_id(match_id)?;
        let mut timers = self.timers.lock()
            .map_err(|e| format!("Failed to lock timers: {}", e))?;

        let current = timers
            .get(match_id)
            .cloned()
            .unwrap_or_else(|| self.store.load(match_id));
        let next = apply(&current);

        // Writes are small local files; blocking the worker under the lock
        // keeps transitions for one process strictly ordered. The old state
        // stays in memory if the write fails.
        self.store.save(&next)?;
        timers.insert(match_id.to_string(), next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::timer::{FileTimerStore, ManualClock, MemoryTimerStore};

    struct FailingStore;

    impl TimerStore for FailingStore {
        fn load(&self, match_id: &str) -> TimerState {
            TimerState::new(match_id)
        }
        fn save(&self, _state: &TimerState) -> Result<(), String> {
            Err("disk full".to_string())
        }
        fn match_ids(&self) -> Result<Vec<String>, String> {
            Ok(Vec::new())
        }
    }

    fn memory_timers() -> (MatchTimers, Arc<ManualClock>, Arc<MemoryTimerStore>) {
        let clock = Arc::new(ManualClock::new(0));
        let store = Arc::new(MemoryTimerStore::new("match"));
        (MatchTimers::new(store.clone(), clock.clone()), clock, store)
    }

    #[test]
    fn live_session_scenario() {
        let (timers, clock, _) = memory_timers();
        assert_eq!(timers.elapsed("42").unwrap(), 0);

        clock.set(1_000);
        let snapshot = timers.toggle("42").unwrap();
        assert!(snapshot.running);
        assert_eq!(timers.state("42").unwrap().last_resume_epoch_millis, 1_000);

        clock.set(4_500);
        assert_eq!(timers.elapsed("42").unwrap(), 3);
        let snapshot = timers.toggle("42").unwrap();
        assert!(!snapshot.running);
        assert_eq!(timers.state("42").unwrap().accumulated_seconds, 3);

        clock.set(10_000);
        timers.toggle("42").unwrap();
        clock.set(12_000);
        assert_eq!(timers.elapsed("42").unwrap(), 5);
        assert_eq!(timers.snapshot("42").unwrap().formatted, "00:05");
    }

    #[test]
    fn every_transition_is_persisted() {
        let (timers, clock, store) = memory_timers();

        clock.set(2_000);
        timers.toggle("7").unwrap();
        assert!(store.load("7").running);

        clock.set(9_000);
        timers.toggle("7").unwrap();
        assert_eq!(store.load("7").accumulated_seconds, 7);

        timers.reset("7").unwrap();
        assert_eq!(store.load("7"), TimerState::new("7"));
    }

    #[test]
    fn restart_counts_time_spent_offline() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(1_000));

        let first = MatchTimers::new(
            Arc::new(FileTimerStore::open(dir.path(), "match").unwrap()),
            clock.clone(),
        );
        first.toggle("42").unwrap();
        drop(first);

        clock.set(61_000);
        let second = MatchTimers::new(
            Arc::new(FileTimerStore::open(dir.path(), "match").unwrap()),
            clock.clone(),
        );
        assert_eq!(second.restore().unwrap(), 1);
        assert_eq!(second.running_matches(), vec!["42".to_string()]);
        assert_eq!(second.elapsed("42").unwrap(), 60);
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let timers = MatchTimers::new(Arc::new(FailingStore), Arc::new(ManualClock::new(0)));

        let err = timers.toggle("1").unwrap_err();
        assert!(err.contains("disk full"));
        assert!(!timers.state("1").unwrap().running);
        assert!(timers.running_matches().is_empty());
    }

    #[test]
    fn invalid_match_id_is_rejected() {
        let (timers, _, _) = memory_timers();
        assert!(timers.toggle("../x").is_err());
        assert!(timers.snapshot("").is_err());
    }

    #[test]
    fn timers_are_independent_per_match() {
        let (timers, clock, _) = memory_timers();
        timers.toggle("1").unwrap();
        clock.advance(3_000);
        timers.toggle("2").unwrap();
        clock.advance(2_000);

        assert_eq!(timers.elapsed("1").unwrap(), 5);
        assert_eq!(timers.elapsed("2").unwrap(), 2);
        assert_eq!(timers.running_matches(), vec!["1".to_string(), "2".to_string()]);
    }
}
