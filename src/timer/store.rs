//! Timer persistence
//!
//! Timers are kept in a key-value store under `<namespace>-<matchId>-timer`
//! with a JSON value holding the three time fields. Missing or unreadable
//! entries load as a fresh timer.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
};
use tracing::{debug, info, warn};

use super::model::TimerState;

const KEY_SUFFIX: &str = "-timer";

/// Durable storage for per-match timer state
pub trait TimerStore: Send + Sync {
    /// Load the timer for `match_id`, or a fresh one if none is stored
    fn load(&self, match_id: &str) -> TimerState;

    /// Durably write `state`, replacing whatever was stored for its match
    fn save(&self, state: &TimerState) -> Result<(), String>;

    /// Match ids that currently have stored state
    fn match_ids(&self) -> Result<Vec<String>, String>;
}

/// Storage key for a match timer
pub fn storage_key(namespace: &str, match_id: &str) -> String {
    format!("{}-{}{}", namespace, match_id, KEY_SUFFIX)
}

/// Inverse of [`storage_key`] for keys in `namespace`
fn match_id_from_key<'a>(namespace: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(namespace)?
        .strip_prefix('-')?
        .strip_suffix(KEY_SUFFIX)
        .filter(|id| !id.is_empty())
}

fn decode(match_id: &str, key: &str, raw: &str) -> TimerState {
    match serde_json::from_str::<TimerState>(raw) {
        Ok(mut state) => {
            state.match_id = match_id.to_string();
            state
        }
        Err(e) => {
            warn!("Discarding corrupt timer state at {}: {}", key, e);
            TimerState::new(match_id)
        }
    }
}

fn encode(state: &TimerState) -> Result<String, String> {
    serde_json::to_string(state)
        .map_err(|e| format!("Failed to serialize timer for match {}: {}", state.match_id, e))
}

/// In-process store, used for tests and ephemeral runs
#[derive(Debug)]
pub struct MemoryTimerStore {
    namespace: String,
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTimerStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Put a raw value under `key`, bypassing serialization
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) -> Result<(), String> {
        let mut entries = self.entries.lock()
            .map_err(|e| format!("Failed to lock timer store: {}", e))?;
        entries.insert(key.into(), value.into());
        Ok(())
    }

    /// Raw stored value under `key`
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok().and_then(|entries| entries.get(key).cloned())
    }
}

impl TimerStore for MemoryTimerStore {
    fn load(&self, match_id: &str) -> TimerState {
        let key = storage_key(&self.namespace, match_id);
        match self.get_raw(&key) {
            Some(raw) => decode(match_id, &key, &raw),
            None => TimerState::new(match_id),
        }
    }

    fn save(&self, state: &TimerState) -> Result<(), String> {
        let raw = encode(state)?;
        self.insert_raw(storage_key(&self.namespace, &state.match_id), raw)
    }

    fn match_ids(&self) -> Result<Vec<String>, String> {
        let entries = self.entries.lock()
            .map_err(|e| format!("Failed to lock timer store: {}", e))?;
        let mut ids: Vec<String> = entries
            .keys()
            .filter_map(|key| match_id_from_key(&self.namespace, key))
            .map(str::to_string)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// One JSON file per timer inside a data directory
#[derive(Debug, Clone)]
pub struct FileTimerStore {
    dir: PathBuf,
    namespace: String,
}

impl FileTimerStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Result<Self, String> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create data directory {}: {}", dir.display(), e))?;

        info!("Timer store opened at {}", dir.display());
        Ok(Self {
            dir,
            namespace: namespace.into(),
        })
    }

    /// File backing the timer for `match_id`
    pub fn path_for(&self, match_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(&self.namespace, match_id)))
    }
}

impl TimerStore for FileTimerStore {
    fn load(&self, match_id: &str) -> TimerState {
        let path = self.path_for(match_id);
        match fs::read_to_string(&path) {
            Ok(raw) => decode(match_id, &path.display().to_string(), &raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No stored timer for match {}, starting fresh", match_id);
                TimerState::new(match_id)
            }
            Err(e) => {
                warn!("Failed to read {}: {}, starting fresh", path.display(), e);
                TimerState::new(match_id)
            }
        }
    }

    fn save(&self, state: &TimerState) -> Result<(), String> {
        let raw = encode(state)?;
        let path = self.path_for(&state.match_id);
        let tmp = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp)
            .map_err(|e| format!("Failed to create {}: {}", tmp.display(), e))?;
        file.write_all(raw.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        drop(file);

        fs::rename(&tmp, &path)
            .map_err(|e| format!("Failed to move {} into place: {}", path.display(), e))?;

        debug!("Saved timer for match {} to {}", state.match_id, path.display());
        Ok(())
    }

    fn match_ids(&self) -> Result<Vec<String>, String> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| format!("Failed to list {}: {}", self.dir.display(), e))?;

        let mut ids = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(key) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Some(id) = match_id_from_key(&self.namespace, key) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
