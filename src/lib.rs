//! # escpos-monitor - ESC/POS Receipt Printer Driver
//!
//! escpos-monitor drives ESC/POS-style receipt printers over a serial
//! link. It provides:
//!
//! - **Protocol implementation**: ESC/POS command builders and status queries
//! - **Status poller**: a non-blocking, tick-driven state machine that
//!   reports whether the printer is online, its fault code, and its chute
//!   sensor state
//! - **Paper check**: a short bounded query of the paper sensor
//! - **Transport**: raw-mode serial tty, plus an in-memory mock
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use escpos_monitor::{
//!     poller::{MonotonicClock, SessionOutcome},
//!     printer::EscPosPrinter,
//!     transport::TtyTransport,
//! };
//!
//! let transport = TtyTransport::open("/dev/ttyUSB0", 115_200)?;
//! let mut printer = EscPosPrinter::new(transport);
//!
//! match printer.query_status(&MonotonicClock::new(), Duration::from_millis(1))? {
//!     SessionOutcome::Complete(report) => println!("printer is {}", report.health()),
//!     SessionOutcome::TimedOut(_) => println!("printer not responding"),
//! }
//!
//! if printer.has_paper()? {
//!     printer.println("Hello World!")?;
//!     printer.feed(2)?;
//! }
//!
//! # Ok::<(), escpos_monitor::error::MonitorError>(())
//! ```
//!
//! ## Polling From an Application Loop
//!
//! ```no_run
//! use escpos_monitor::poller::{self, Clock, MonotonicClock, PollSession, TIMEOUT_CODE};
//! use escpos_monitor::printer::PollConfig;
//! use escpos_monitor::transport::TtyTransport;
//!
//! let mut transport = TtyTransport::open_default()?;
//! let config = PollConfig::default();
//! let clock = MonotonicClock::new();
//! let mut session = PollSession::new();
//! let mut code = 0;
//!
//! loop {
//!     let next = poller::poll(&mut session, &mut transport, &config, clock.now_ms(), code)?;
//!     if next == TIMEOUT_CODE || (next != code && session.is_idle()) {
//!         break;
//!     }
//!     code = next;
//!     // ... other work for this iteration ...
//! }
//! # Ok::<(), escpos_monitor::error::MonitorError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders and status replies |
//! | [`poller`] | Status state machine, paper check, clocks |
//! | [`transport`] | Communication backends |
//! | [`printer`] | Printer facade and configuration |
//! | [`error`] | Error types |

pub mod error;
pub mod poller;
pub mod printer;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use error::MonitorError;
pub use printer::{EscPosPrinter, PollConfig, PrinterConfig};
pub use protocol::status::StatusReport;
pub use transport::{MockTransport, Transport, TtyTransport};
