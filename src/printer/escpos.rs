//! # ESC/POS Printer
//!
//! [`EscPosPrinter`] owns a transport and exposes the command vocabulary
//! of [`crate::protocol::commands`] as methods, plus the status poller
//! and the paper check.

use std::time::Duration;

use crate::error::Result;
use crate::poller::{self, Clock, PollSession, SessionOutcome};
use crate::printer::config::PollConfig;
use crate::protocol::commands::{self, Justify, Size};
use crate::protocol::status::StatusReport;
use crate::transport::Transport;

/// # ESC/POS Printer
///
/// ## Example
///
/// ```
/// use escpos_monitor::printer::EscPosPrinter;
/// use escpos_monitor::protocol::commands::Justify;
/// use escpos_monitor::transport::MockTransport;
///
/// let mut printer = EscPosPrinter::new(MockTransport::new());
/// printer.init()?;
/// printer.justify(Justify::Center)?;
/// printer.println("Hello World!")?;
/// printer.feed(2)?;
///
/// assert!(printer.transport().written().ends_with(&[0x1B, b'd', 2]));
/// # Ok::<(), escpos_monitor::error::MonitorError>(())
/// ```
pub struct EscPosPrinter<T: Transport> {
    transport: T,
    config: PollConfig,
    session: PollSession,
}

impl<T: Transport> EscPosPrinter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, PollConfig::default())
    }

    pub fn with_config(transport: T, config: PollConfig) -> Self {
        Self {
            transport,
            config,
            session: PollSession::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn session(&self) -> &PollSession {
        &self.session
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send raw, already-encoded bytes.
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.transport.write(data)
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Print text without a trailing line feed. DC3 bytes are dropped.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.transport.write(&commands::text(text))
    }

    pub fn println(&mut self, text: &str) -> Result<()> {
        self.transport.write(&commands::text_line(text))
    }

    /// Print a greeting and feed two lines.
    pub fn test(&mut self) -> Result<()> {
        self.println("Hello World!")?;
        self.feed(2)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn init(&mut self) -> Result<()> {
        self.transport.write(&commands::init())
    }

    pub fn test_page(&mut self) -> Result<()> {
        self.transport.write(&commands::test_page())
    }

    pub fn online(&mut self) -> Result<()> {
        self.transport.write(&commands::online())
    }

    pub fn offline(&mut self) -> Result<()> {
        self.transport.write(&commands::offline())
    }

    pub fn feed(&mut self, lines: u8) -> Result<()> {
        self.transport.write(&commands::feed(lines))
    }

    pub fn feed_rows(&mut self, rows: u8) -> Result<()> {
        self.transport.write(&commands::feed_rows(rows))
    }

    pub fn form_feed(&mut self) -> Result<()> {
        self.transport.write(&commands::form_feed())
    }

    pub fn auto_cut(&mut self) -> Result<()> {
        self.transport.write(&commands::auto_cut())
    }

    pub fn inverse(&mut self, on: bool) -> Result<()> {
        let cmd = if on {
            commands::inverse_on()
        } else {
            commands::inverse_off()
        };
        self.transport.write(&cmd)
    }

    pub fn upside_down(&mut self, on: bool) -> Result<()> {
        let cmd = if on {
            commands::upside_down_on()
        } else {
            commands::upside_down_off()
        };
        self.transport.write(&cmd)
    }

    pub fn emphasized(&mut self, on: bool) -> Result<()> {
        let cmd = if on {
            commands::emphasized_on()
        } else {
            commands::emphasized_off()
        };
        self.transport.write(&cmd)
    }

    /// Underline with the given weight (0-2), or turn it off with `None`.
    pub fn underline(&mut self, weight: Option<u8>) -> Result<()> {
        let cmd = match weight {
            Some(w) => commands::underline_on(w),
            None => commands::underline_off(),
        };
        self.transport.write(&cmd)
    }

    pub fn justify(&mut self, value: Justify) -> Result<()> {
        self.transport.write(&commands::justify(value))
    }

    pub fn set_size(&mut self, size: Size) -> Result<()> {
        self.transport.write(&commands::set_size(size))
    }

    pub fn set_size_scaled(&mut self, height: u8, width: u8) -> Result<()> {
        self.transport.write(&commands::set_size_scaled(height, width))
    }

    pub fn set_area(&mut self) -> Result<()> {
        self.transport.write(&commands::set_area())
    }

    pub fn set_relative_position(&mut self) -> Result<()> {
        self.transport.write(&commands::set_relative_position())
    }

    pub fn rotate_start(&mut self) -> Result<()> {
        self.transport.write(&commands::rotate_start())
    }

    pub fn rotate_stop(&mut self) -> Result<()> {
        self.transport.write(&commands::rotate_stop())
    }

    pub fn send_etx(&mut self) -> Result<()> {
        self.transport.write(&commands::etx())
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Advance the status session by one tick. See [`poller::poll`].
    ///
    /// The printer's transport must not be used for anything else while a
    /// session is in progress.
    pub fn poll_status(&mut self, stage_in: i32, now: u64) -> Result<i32> {
        poller::poll(
            &mut self.session,
            &mut self.transport,
            &self.config,
            now,
            stage_in,
        )
    }

    /// Results of the current or most recent status session.
    pub fn status(&self) -> &StatusReport {
        self.session.results()
    }

    /// Run a complete status session, blocking until it finishes or times out.
    pub fn query_status<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
        tick: Duration,
    ) -> Result<SessionOutcome> {
        poller::run_session(
            &mut self.session,
            &mut self.transport,
            &self.config,
            clock,
            tick,
        )
    }

    /// Ask the paper sensor whether paper is loaded. Blocks briefly.
    pub fn has_paper(&mut self) -> Result<bool> {
        poller::has_paper(&mut self.transport, &self.config)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn printer() -> EscPosPrinter<MockTransport> {
        EscPosPrinter::new(MockTransport::new())
    }

    #[test]
    fn test_print_strips_dc3() {
        let mut p = printer();
        p.print("A\x13B").unwrap();
        assert_eq!(p.transport().written(), b"AB");
    }

    #[test]
    fn test_hello_world() {
        let mut p = printer();
        p.test().unwrap();
        let mut expected = b"Hello World!\n".to_vec();
        expected.extend([0x1B, b'd', 2]);
        assert_eq!(p.transport().written(), expected.as_slice());
    }

    #[test]
    fn test_toggles() {
        let mut p = printer();
        p.inverse(true).unwrap();
        p.inverse(false).unwrap();
        p.emphasized(true).unwrap();
        p.underline(Some(5)).unwrap();
        p.underline(None).unwrap();
        assert_eq!(
            p.transport().writes(),
            &[
                vec![0x1D, b'B', 1],
                vec![0x1D, b'B', 0],
                vec![0x1B, b'E'],
                vec![0x1B, b'-', 2],
                vec![0x1B, b'-', 0],
            ]
        );
    }

    #[test]
    fn test_poll_status_uses_own_session() {
        let mut p = printer();
        let code = p.poll_status(0, 0).unwrap();
        assert_eq!(code, 0);
        assert!(!p.session().is_idle());
        assert_eq!(p.transport().written(), &[0x10, 0x04, 0x01]);
    }

    #[test]
    fn test_has_paper_through_printer() {
        let mut p = EscPosPrinter::new(MockTransport::with_pending(&[0x0C]));
        assert!(!p.has_paper().unwrap());
    }
}
