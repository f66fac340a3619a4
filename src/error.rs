//! # Error Types
//!
//! This module defines error types used throughout the escpos-monitor library.
//!
//! A status query that never gets an answer is *not* an error here: the
//! poller reports it through its return code (see [`crate::poller::TIMEOUT_CODE`]).

use thiserror::Error;

/// Main error type for escpos-monitor operations
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Transport-level errors (open, configure, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid command or parameter
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, MonitorError>;
