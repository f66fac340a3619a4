//! # ESC/POS Printer Commands
//!
//! Stateless builders for the ESC/POS command set understood by the
//! receipt printer. Every function maps one printer operation to a fixed
//! byte sequence; nothing here touches a transport.
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `FF`, `ETX`
//! - Two bytes: `ESC @`, `ESC E`, `ESC F`
//! - Three bytes with a parameter: `ESC d n`, `GS ! n`, `ESC - n`
//!
//! ## Reference
//!
//! Epson ESC/POS Command Reference
//! (<https://reference.epson-biz.com/modules/ref_escpos/>)

use crate::error::{MonitorError, Result};

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for character size, inverse printing, and sensor queries.
pub const GS: u8 = 0x1D;

/// DLE (Data Link Escape) - Real-time command prefix
///
/// `DLE EOT n` requests are answered immediately, even while the printer
/// is busy or offline. See [`super::status`].
pub const DLE: u8 = 0x10;

/// EOT (End of Transmission) - Second byte of real-time status requests
pub const EOT: u8 = 0x04;

/// LF (Line Feed) - Print and advance one line
pub const LF: u8 = 0x0A;

/// FF (Form Feed) - Print buffer and eject
pub const FF: u8 = 0x0C;

/// ETX (End of Text)
pub const ETX: u8 = 0x03;

/// DC3 - Stripped from text output and used as the rotation prefix
pub const DC3: u8 = 0x13;

/// VT (Vertical Tab) - Ends a rotated block
pub const VT: u8 = 0x0B;

// ============================================================================
// INITIALIZATION & ONLINE STATE
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on defaults: clears the print buffer
/// and resets justification, size, underline and emphasis.
///
/// ## Protocol Details
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ## Example
///
/// ```
/// use escpos_monitor::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Take the Printer Offline (ESC = 0)
///
/// Print commands sent after this are ignored until [`online`] is sent.
#[inline]
pub fn offline() -> Vec<u8> {
    vec![ESC, b'=', 0]
}

/// # Take the Printer Back Online (ESC = 1)
#[inline]
pub fn online() -> Vec<u8> {
    vec![ESC, b'=', 1]
}

// ============================================================================
// PAPER FEED & CUT
// ============================================================================

/// # Print and Feed n Lines (ESC d n)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | ESC d n  |
/// | Hex     | 1B 64 n  |
#[inline]
pub fn feed(lines: u8) -> Vec<u8> {
    vec![ESC, b'd', lines]
}

/// # Print and Feed n Dot Rows (ESC J n)
///
/// Feeds by individual pixel rows rather than whole lines.
#[inline]
pub fn feed_rows(rows: u8) -> Vec<u8> {
    vec![ESC, b'J', rows]
}

/// Form feed (FF)
#[inline]
pub fn form_feed() -> Vec<u8> {
    vec![FF]
}

/// # Auto Cut (ESC v 0)
///
/// Device-specific cut command used by the kiosk printers this driver
/// targets.
#[inline]
pub fn auto_cut() -> Vec<u8> {
    vec![ESC, 0x76, 0]
}

// ============================================================================
// TEXT STYLE
// ============================================================================

/// Inverse (white on black) printing on (GS B 1)
#[inline]
pub fn inverse_on() -> Vec<u8> {
    vec![GS, b'B', 1]
}

/// Inverse printing off (GS B 0)
#[inline]
pub fn inverse_off() -> Vec<u8> {
    vec![GS, b'B', 0]
}

/// Upside-down printing on (ESC { 1)
#[inline]
pub fn upside_down_on() -> Vec<u8> {
    vec![ESC, b'{', 1]
}

/// Upside-down printing off (ESC { 0)
#[inline]
pub fn upside_down_off() -> Vec<u8> {
    vec![ESC, b'{', 0]
}

/// Emphasized printing on (ESC E)
#[inline]
pub fn emphasized_on() -> Vec<u8> {
    vec![ESC, b'E']
}

/// Emphasized printing off (ESC F)
#[inline]
pub fn emphasized_off() -> Vec<u8> {
    vec![ESC, b'F']
}

/// # Underline (ESC - n)
///
/// ## Weights
///
/// | n | Result |
/// |---|--------|
/// | 0 | No underline |
/// | 1 | Normal underline |
/// | 2 | Thick underline |
///
/// Weights above 2 are clamped to 2.
///
/// ## Example
///
/// ```
/// use escpos_monitor::protocol::commands;
///
/// assert_eq!(commands::underline_on(7), vec![0x1B, b'-', 2]);
/// ```
#[inline]
pub fn underline_on(weight: u8) -> Vec<u8> {
    vec![ESC, b'-', weight.min(2)]
}

/// Underline off (ESC - 0)
#[inline]
pub fn underline_off() -> Vec<u8> {
    vec![ESC, b'-', 0]
}

/// Text justification for [`justify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

impl Justify {
    /// Parse the single-letter code used on the command line (`L`, `C`, `R`).
    ///
    /// Unknown letters fall back to [`Justify::Left`].
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'C' => Self::Center,
            'R' => Self::Right,
            _ => Self::Left,
        }
    }

    /// Like [`from_code`](Self::from_code), but rejects unknown letters.
    pub fn parse(code: char) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'L' => Ok(Self::Left),
            'C' => Ok(Self::Center),
            'R' => Ok(Self::Right),
            other => Err(MonitorError::InvalidCommand(format!(
                "unknown justification '{}' (expected L, C or R)",
                other
            ))),
        }
    }

    fn as_param(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Center => 1,
            Self::Right => 2,
        }
    }
}

/// # Justification (ESC a n)
///
/// | Justify | n |
/// |---------|---|
/// | Left    | 0 |
/// | Center  | 1 |
/// | Right   | 2 |
#[inline]
pub fn justify(value: Justify) -> Vec<u8> {
    vec![ESC, b'a', value.as_param()]
}

/// Named character sizes for [`set_size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Size {
    /// Standard width and height
    #[default]
    Small,
    /// Double height
    Medium,
    /// Double width and height
    Large,
    /// Triple width and height
    ExtraLarge,
}

impl Size {
    /// Parse the single-letter code (`S`, `M`, `L`, `X`).
    ///
    /// Anything unrecognised is treated as [`Size::Small`].
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'M' => Self::Medium,
            'L' => Self::Large,
            'X' => Self::ExtraLarge,
            _ => Self::Small,
        }
    }

    /// Like [`from_code`](Self::from_code), but rejects unknown letters.
    pub fn parse(code: char) -> Result<Self> {
        match code.to_ascii_uppercase() {
            'S' => Ok(Self::Small),
            'M' => Ok(Self::Medium),
            'L' => Ok(Self::Large),
            'X' => Ok(Self::ExtraLarge),
            other => Err(MonitorError::InvalidCommand(format!(
                "unknown size '{}' (expected S, M, L or X)",
                other
            ))),
        }
    }

    fn as_param(self) -> u8 {
        match self {
            Self::Small => 0x00,
            Self::Medium => 0x01,
            Self::Large => 0x11,
            Self::ExtraLarge => 0x22,
        }
    }
}

/// # Character Size (GS ! n)
///
/// ## Example
///
/// ```
/// use escpos_monitor::protocol::commands::{self, Size};
///
/// assert_eq!(commands::set_size(Size::Large), vec![0x1D, b'!', 0x11]);
/// ```
#[inline]
pub fn set_size(size: Size) -> Vec<u8> {
    vec![GS, b'!', size.as_param()]
}

/// # Character Size from Raw Multipliers (GS ! n)
///
/// Packs `width` into bits 3-5 and `height` into bits 0-2. Each value is
/// masked to 3 bits.
#[inline]
pub fn set_size_scaled(height: u8, width: u8) -> Vec<u8> {
    let n = ((width & 0x7) << 3) | (height & 0x7);
    vec![GS, b'!', n]
}

// ============================================================================
// LAYOUT & DEVICE-SPECIFIC
// ============================================================================

/// # Self-Test Page (GS ( A 2 0 0 3)
#[inline]
pub fn test_page() -> Vec<u8> {
    vec![GS, b'(', b'A', 2, 0, 0, 3]
}

/// # Print Area
///
/// Sets the print area width (`GS W`) to 300 dots and the absolute
/// position (`ESC $`) to 100 dots.
///
/// | Part          | Hex           |
/// |---------------|---------------|
/// | Area width    | 1D 57 2C 01   |
/// | Abs. position | 1B 24 64 00   |
#[inline]
pub fn set_area() -> Vec<u8> {
    vec![GS, b'W', 0x2C, 0x01, ESC, b'$', 0x64, 0x00]
}

/// Relative print position (ESC \ 0x02 0x20)
#[inline]
pub fn set_relative_position() -> Vec<u8> {
    vec![ESC, b'\\', 0x02, 0x20]
}

/// Start a rotated block (DC3 D)
#[inline]
pub fn rotate_start() -> Vec<u8> {
    vec![DC3, b'D']
}

/// End a rotated block (VT)
#[inline]
pub fn rotate_stop() -> Vec<u8> {
    vec![VT]
}

/// End of text marker (ETX)
#[inline]
pub fn etx() -> Vec<u8> {
    vec![ETX]
}

// ============================================================================
// TEXT
// ============================================================================

/// Encode text for the printer.
///
/// DC3 (0x13) bytes are dropped: on this printer they start a rotated
/// block, so they must never leak through from user text.
///
/// ## Example
///
/// ```
/// use escpos_monitor::protocol::commands;
///
/// assert_eq!(commands::text("ab\x13c"), b"abc".to_vec());
/// ```
pub fn text(s: &str) -> Vec<u8> {
    s.bytes().filter(|&b| b != DC3).collect()
}

/// Encode text followed by a line feed.
pub fn text_line(s: &str) -> Vec<u8> {
    let mut data = text(s);
    data.push(LF);
    data
}

// ============================================================================
// TESTS
// ============================================================================
