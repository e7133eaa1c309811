//! Match Clock - A local live-match clock server
//!
//! This library keeps one resumable elapsed timer per match, persists every
//! start, pause and reset so the clock survives restarts, stamps live match
//! events with the current elapsed time, and lays out video markers.

pub mod config;
pub mod events;
pub mod timer;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;
pub mod video;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timer::{MatchTimers, TimerState, TimerStore};
pub use utils::signals::shutdown_signal;
