//! # Printer Transport Layer
//!
//! The poller and the printer facade talk to the device through the
//! [`Transport`] trait: a full-duplex byte channel with no framing, where
//! received bytes must be polled for.
//!
//! ## Available Transports
//!
//! - [`tty`]: Raw-mode serial tty device (Linux/Unix)
//! - [`mock`]: Scripted in-memory transport for tests and dry runs

pub mod mock;
pub mod tty;

pub use mock::MockTransport;
pub use tty::TtyTransport;

use crate::error::Result;

/// Byte-oriented, full-duplex serial channel.
///
/// Implementations must never block in [`available`](Transport::available)
/// or [`read_byte`](Transport::read_byte): "no data yet" is the normal case.
pub trait Transport {
    /// Send bytes to the device.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Number of received bytes that have not been read yet.
    fn available(&mut self) -> usize;

    /// Take the next received byte, if any.
    fn read_byte(&mut self) -> Option<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}
