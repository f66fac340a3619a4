//! # Paper Presence Check
//!
//! A short, bounded-blocking query of the paper sensor. Unlike the
//! multi-stage session in [`super::poll`], this sends its request and
//! spins on the transport for a fixed number of attempts.

use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::printer::PollConfig;
use crate::protocol::status::{paper_present, paper_query};
use crate::transport::Transport;

/// Ask the printer whether paper is loaded.
///
/// Returns `true` when the reply has both paper-out bits clear. When no
/// reply arrives within `paper_poll_attempts`, the status defaults to 0
/// and the check also reports paper present.
///
/// ## Example
///
/// ```
/// use escpos_monitor::poller::has_paper;
/// use escpos_monitor::printer::PollConfig;
/// use escpos_monitor::transport::MockTransport;
///
/// let mut transport = MockTransport::with_pending(&[0b0000_1100]);
/// assert!(!has_paper(&mut transport, &PollConfig::default())?);
/// # Ok::<(), escpos_monitor::error::MonitorError>(())
/// ```
pub fn has_paper<T: Transport + ?Sized>(transport: &mut T, config: &PollConfig) -> Result<bool> {
    transport.write(&paper_query())?;

    let interval = Duration::from_millis(config.paper_poll_interval_ms);
    let mut reply = None;
    for _ in 0..config.paper_poll_attempts {
        if transport.available() > 0 {
            reply = transport.read_byte();
            if reply.is_some() {
                break;
            }
        }
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    let status = match reply {
        Some(byte) => {
            tracing::debug!("paper sensor 0x{:02X}", byte);
            byte
        }
        None => {
            // TODO: decide with hardware testing whether silence should report paper out
            tracing::debug!(
                attempts = config.paper_poll_attempts,
                "no paper sensor reply, assuming paper present"
            );
            0
        }
    };

    Ok(paper_present(status))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_sends_paper_query() {
        let mut transport = MockTransport::with_pending(&[0x00]);
        has_paper(&mut transport, &PollConfig::default()).unwrap();
        assert_eq!(transport.written(), &[0x1D, 0x72, 0x01]);
    }

    #[test]
    fn test_paper_bits_clear() {
        let mut transport = MockTransport::with_pending(&[0b1111_0011]);
        assert!(has_paper(&mut transport, &PollConfig::default()).unwrap());
    }

    #[test]
    fn test_paper_bits_set() {
        let mut transport = MockTransport::with_pending(&[0b0000_1100]);
        assert!(!has_paper(&mut transport, &PollConfig::default()).unwrap());

        let mut transport = MockTransport::with_pending(&[0b0000_0100]);
        assert!(!has_paper(&mut transport, &PollConfig::default()).unwrap());
    }

    #[test]
    fn test_no_reply_defaults_to_present() {
        let mut transport = MockTransport::new();
        assert!(has_paper(&mut transport, &PollConfig::default()).unwrap());
    }

    #[test]
    fn test_consumes_only_first_byte() {
        let mut transport = MockTransport::with_pending(&[0x00, 0x0C]);
        assert!(has_paper(&mut transport, &PollConfig::default()).unwrap());
        assert_eq!(transport.pending(), 1);
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut transport = MockTransport::new();
        transport.set_fail_writes(true);
        assert!(has_paper(&mut transport, &PollConfig::default()).is_err());
    }
}
