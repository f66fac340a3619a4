//! # Mock Transport
//!
//! In-memory [`Transport`] used by the tests and by the CLI's `--dry-run`
//! mode. Received bytes are queued up front (or injected between polls)
//! and everything written is recorded.

use std::collections::VecDeque;

use super::Transport;
use crate::error::{MonitorError, Result};

/// Scripted transport: an rx queue and a write log.
#[derive(Debug, Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    writes: Vec<Vec<u8>>,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose rx buffer already holds `pending`.
    pub fn with_pending(pending: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.push_rx(pending);
        transport
    }

    /// Simulate bytes arriving from the device.
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Make every subsequent write fail (simulates a dropped link).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// All bytes written so far, concatenated.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Each write call as a separate entry.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Bytes still waiting in the rx buffer.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn clear_written(&mut self) {
        self.written.clear();
        self.writes.clear();
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(MonitorError::Transport("Write failed: link down".to_string()));
        }
        self.written.extend_from_slice(data);
        self.writes.push(data.to_vec());
        Ok(())
    }

    fn available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_in_order() {
        let mut transport = MockTransport::with_pending(&[1, 2]);
        transport.push_rx(&[3]);
        assert_eq!(transport.available(), 3);
        assert_eq!(transport.read_byte(), Some(1));
        assert_eq!(transport.read_byte(), Some(2));
        assert_eq!(transport.read_byte(), Some(3));
        assert_eq!(transport.read_byte(), None);
        assert_eq!(transport.available(), 0);
    }

    #[test]
    fn test_records_writes() {
        let mut transport = MockTransport::new();
        transport.write(&[0x10, 0x04, 0x01]).unwrap();
        transport.write(&[0x0C]).unwrap();
        assert_eq!(transport.written(), &[0x10, 0x04, 0x01, 0x0C]);
        assert_eq!(transport.writes().len(), 2);

        transport.clear_written();
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_failing_writes() {
        let mut transport = MockTransport::new();
        transport.set_fail_writes(true);
        assert!(matches!(transport.write(&[0x00]), Err(MonitorError::Transport(_))));
        assert!(transport.written().is_empty());
    }
}
