//! # ESC/POS Protocol Implementation
//!
//! Low-level command builders for the ESC/POS-style protocol spoken by
//! the receipt printer.
//!
//! ## Module Structure
//!
//! - [`commands`]: Printing and configuration commands (init, feed, style)
//! - [`status`]: Status queries and reply interpretation
//!
//! ## Usage Example
//!
//! ```
//! use escpos_monitor::protocol::commands::{self, Justify, Size};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::justify(Justify::Center));
//! data.extend(commands::set_size(Size::Large));
//! data.extend(commands::text_line("RECEIPT"));
//! data.extend(commands::set_size(Size::Small));
//! data.extend(commands::feed(2));
//! data.extend(commands::auto_cut());
//!
//! // Send `data` to the printer via a transport...
//! ```

pub mod commands;
pub mod status;
