//! # Printer Configuration
//!
//! Connection settings for a printer and the timing parameters of the
//! status poller.
//!
//! ## Defaults
//!
//! | Setting                  | Default        |
//! |--------------------------|----------------|
//! | device                   | `/dev/ttyUSB0` |
//! | baud_rate                | 115200         |
//! | grace_period_ms          | 10             |
//! | reply_timeout_ms         | 200            |
//! | paper_poll_attempts      | 10             |
//! | paper_poll_interval_ms   | 0              |
//!
//! ## Loading
//!
//! ```
//! use escpos_monitor::printer::PrinterConfig;
//!
//! let config = PrinterConfig::from_json_str(r#"{ "poll": { "reply_timeout_ms": 500 } }"#)?;
//! assert_eq!(config.poll.reply_timeout_ms, 500);
//! assert_eq!(config.poll.grace_period_ms, 10);
//! # Ok::<(), escpos_monitor::error::MonitorError>(())
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::transport::tty::{DEFAULT_BAUD, DEFAULT_DEVICE};

/// # Poll Timing
///
/// All durations are in ticks of the poller's [`Clock`](crate::poller::Clock),
/// which counts milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay after sending a query before its reply is looked at
    pub grace_period_ms: u64,

    /// Longest wait for one stage's reply before the session is aborted
    pub reply_timeout_ms: u64,

    /// How many times the blocking paper check looks for a reply
    pub paper_poll_attempts: u32,

    /// Sleep between paper check attempts (0 = tight loop)
    pub paper_poll_interval_ms: u64,
}

impl PollConfig {
    pub const DEFAULT: Self = Self {
        grace_period_ms: 10,
        reply_timeout_ms: 200,
        paper_poll_attempts: 10,
        paper_poll_interval_ms: 0,
    };

    /// Check the settings for values the poller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.paper_poll_attempts == 0 {
            return Err(MonitorError::Config(
                "paper_poll_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// # Printer Configuration
///
/// Where the printer is connected and how it is polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Human-readable name used in log output
    pub name: String,

    /// Serial device path
    pub device: String,

    /// Line speed in baud
    pub baud_rate: u32,

    /// Status poller timing
    pub poll: PollConfig,
}

impl PrinterConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.poll.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            MonitorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            name: "ESC/POS printer".to_string(),
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD,
            poll: PollConfig::DEFAULT,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.grace_period_ms, 10);
        assert_eq!(config.reply_timeout_ms, 200);
        assert_eq!(config.paper_poll_attempts, 10);
        assert_eq!(config.paper_poll_interval_ms, 0);
    }

    #[test]
    fn test_printer_defaults() {
        let config = PrinterConfig::default();
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.poll, PollConfig::DEFAULT);
    }

    #[test]
    fn test_partial_json() {
        let config = PrinterConfig::from_json_str(
            r#"{ "device": "/dev/ttyS1", "poll": { "grace_period_ms": 25 } }"#,
        )
        .unwrap();
        assert_eq!(config.device, "/dev/ttyS1");
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.poll.grace_period_ms, 25);
        assert_eq!(config.poll.reply_timeout_ms, 200);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PrinterConfig::from_json_str("{ device: }"),
            Err(MonitorError::Json(_))
        ));
    }

    #[test]
    fn test_zero_paper_attempts_rejected() {
        let result = PrinterConfig::from_json_str(r#"{ "poll": { "paper_poll_attempts": 0 } }"#);
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PrinterConfig::load("/nonexistent/escpos-monitor.json");
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }
}
