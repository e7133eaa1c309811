//! State management module
//!
//! Shared application state handed to the HTTP handlers and background tasks.

pub mod app_state;

// Re-export main types
pub use app_state::AppState;
