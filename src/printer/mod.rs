//! # Printer Module
//!
//! ## Modules
//!
//! - [`config`]: Connection settings and poller timing
//! - [`escpos`]: The printer facade tying commands, transport and poller together

pub mod config;
pub mod escpos;

pub use config::{PollConfig, PrinterConfig};
pub use escpos::EscPosPrinter;
