//! # Serial TTY Transport
//!
//! Talks to the printer through a serial tty device (USB-serial adapter,
//! `/dev/ttyUSB0`, `/dev/ttyS0`, ...).
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so status bytes and binary command
//! parameters pass through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL
//! - **No software flow control**: IXON, IXOFF, IXANY
//! - **No output processing**: OPOST
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN
//! - **Non-blocking reads**: VMIN = 0, VTIME = 0
//!
//! The device is opened with `O_NONBLOCK | O_NOCTTY` so `open` does not
//! wait for carrier detect on a line without DCD. `O_NONBLOCK` is cleared
//! once `CLOCAL` is set, leaving writes blocking.
//!
//! ## Reading
//!
//! [`available`](Transport::available) asks the kernel how many bytes are
//! queued (`FIONREAD`), so the poller can check for a reply on every tick
//! without ever blocking.
//!
//! ## Chunked Writes
//!
//! Large writes are split into chunks with a short delay in between so
//! slow printers are not overrun.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::Transport;
use crate::error::{MonitorError, Result};

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default line speed
pub const DEFAULT_BAUD: u32 = 115_200;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 1024;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Serial Printer Transport
///
/// ## Example
///
/// ```no_run
/// use escpos_monitor::protocol::commands;
/// use escpos_monitor::transport::{Transport, TtyTransport};
///
/// let mut transport = TtyTransport::open("/dev/ttyUSB0", 115_200)?;
/// transport.write(&commands::init())?;
///
/// # Ok::<(), escpos_monitor::error::MonitorError>(())
/// ```
pub struct TtyTransport {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl TtyTransport {
    /// Open a serial device and configure it for raw binary I/O.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - The baud rate is not supported
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, baud: u32) -> Result<Self> {
        let path = device.as_ref();

        let file = open_device(path).map_err(|e| {
            MonitorError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        configure_tty_raw(file.as_raw_fd(), baud)?;
        set_blocking(file.as_raw_fd())
            .map_err(|e| MonitorError::Transport(format!("fcntl failed: {}", e)))?;
        tracing::debug!(device = %path.display(), baud, "serial device configured");

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Open [`DEFAULT_DEVICE`] at [`DEFAULT_BAUD`].
    pub fn open_default() -> Result<Self> {
        Self::open(DEFAULT_DEVICE, DEFAULT_BAUD)
    }

    /// Set the chunk size for large writes. Default is 1024 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 2ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }
}

impl Transport for TtyTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        if data.len() <= self.chunk_size {
            self.file
                .write_all(data)
                .map_err(|e| MonitorError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file
                    .write_all(chunk)
                    .map_err(|e| MonitorError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file
            .flush()
            .map_err(|e| MonitorError::Transport(format!("Flush failed: {}", e)))
    }

    fn available(&mut self) -> usize {
        match bytes_queued(self.file.as_raw_fd()) {
            Ok(n) => n,
            Err(e) => {
                // A vanished device looks like silence; the poller's timeout handles it.
                tracing::debug!("FIONREAD failed: {}", e);
                0
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf) {
            Ok(1) => Some(buf[0]),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                tracing::debug!("serial read failed: {}", e);
                None
            }
        }
    }
}

/// Open read/write without waiting for carrier detect.
#[cfg(unix)]
fn open_device(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NONBLOCK | libc::O_NOCTTY)
        .open(path)
}

/// Clear `O_NONBLOCK` on an open descriptor.
#[cfg(unix)]
fn set_blocking(fd: i32) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Number of bytes waiting in the kernel receive queue.
#[cfg(unix)]
fn bytes_queued(fd: i32) -> io::Result<usize> {
    let mut count: libc::c_int = 0;
    let result = unsafe { libc::ioctl(fd, libc::FIONREAD, &mut count as *mut libc::c_int) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(count.max(0) as usize)
}

/// Map a numeric baud rate to its termios speed constant.
#[cfg(unix)]
fn speed_for_baud(baud: u32) -> Result<libc::speed_t> {
    let speed = match baud {
        9_600 => libc::B9600,
        19_200 => libc::B19200,
        38_400 => libc::B38400,
        57_600 => libc::B57600,
        115_200 => libc::B115200,
        230_400 => libc::B230400,
        other => {
            return Err(MonitorError::Config(format!("Unsupported baud rate {}", other)));
        }
    };
    Ok(speed)
}

/// Configure a file descriptor for raw TTY mode at the given speed.
///
/// IXON/IXOFF/IXANY must be off: 0x11 and 0x13 are legal bytes in both
/// commands and status replies.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, baud: u32) -> Result<()> {
    use std::mem::MaybeUninit;

    let speed = speed_for_baud(baud)?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(MonitorError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    // read() returns immediately with whatever is queued
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 0;

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
    };
    if result != 0 {
        return Err(MonitorError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(MonitorError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
