//! Real-time log streaming via Server-Sent Events (SSE).
//!
//! This module provides a broadcast channel for pipeline stage logs
//! that can be streamed to the upload page via SSE.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Pipeline stage the entry belongs to (load, consolidate, export, server)
    pub stage: String,
    /// Log message
    pub message: String,
}

impl LogEntry {
    pub fn info(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn success(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Success,
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn warning(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Warning,
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn error(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a log entry to all subscribers
    pub fn log(&self, entry: LogEntry) {
        // Also print to stdout
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        println!("{} [{}] {}", prefix, entry.stage, entry.message);

        // Broadcast to SSE clients (ignore if no receivers)
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(stage: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(stage, msg));
}

pub fn log_success(stage: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(stage, msg));
}

pub fn log_warning(stage: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(stage, msg));
}

pub fn log_error(stage: &str, msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(stage, msg));
}
