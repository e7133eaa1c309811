//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod refresh;

// Re-export main functions
pub use refresh::display_refresh_task;
