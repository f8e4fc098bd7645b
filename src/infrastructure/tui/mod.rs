//! # Terminal Logging
//!
//! Captures tracing events into a bounded buffer so the terminal UI can show them
//! while the screen is in raw mode.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

pub mod logging;

pub use logging::TuiLogLayer;

/// Oldest entries are dropped past this many.
pub const LOG_CAPACITY: usize = 1000;

pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: String,
}

pub fn log_buffer() -> LogBuffer {
    Arc::new(Mutex::new(VecDeque::new()))
}
