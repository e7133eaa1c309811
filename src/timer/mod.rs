//! Match timer module
//!
//! Resumable per-match elapsed timers: the pure model, the persistence
//! boundary, the wall clock, and the service tying them together.

pub mod clock;
pub mod model;
pub mod service;
pub mod store;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{current_elapsed, format_elapsed, reset, toggle, TimerSnapshot, TimerState};
pub use service::MatchTimers;
pub use store::{storage_key, FileTimerStore, MemoryTimerStore, TimerStore};
