//! # Status Queries and Replies
//!
//! Real-time status requests (`DLE EOT n`) and the paper sensor request
//! (`GS r 1`), together with the rules for interpreting the single-byte
//! replies the printer sends back.
//!
//! ## Wire Format
//!
//! Every request is exactly three bytes. Every reply is exactly one byte,
//! with no framing, checksum or sequence number: a reply can only be
//! matched to its request by ordering.
//!
//! | Query        | Bytes      | Reply                       |
//! |--------------|------------|-----------------------------|
//! | Online       | 10 04 01   | `0x16` when healthy         |
//! | Error        | 10 04 02   | device fault code           |
//! | Chute sensor | 10 04 05   | paper-path sensor state     |
//! | Paper        | 1D 72 01   | bits 2-3 set when paper out |

use serde::{Deserialize, Serialize};

use super::commands::{DLE, EOT, GS};

/// Reply to the online query that means "online, no fault".
pub const ONLINE_OK: u8 = 0x16;

/// Bits of the paper sensor reply that signal "paper not present".
pub const PAPER_OUT_MASK: u8 = 0b0000_1100;

/// Status category requested by a `DLE EOT n` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusQuery {
    Online,
    Error,
    Chute,
}

impl StatusQuery {
    /// The `n` parameter of `DLE EOT n`
    pub const fn subcommand(self) -> u8 {
        match self {
            Self::Online => 0x01,
            Self::Error => 0x02,
            Self::Chute => 0x05,
        }
    }

    /// Full 3-byte request
    pub const fn command(self) -> [u8; 3] {
        [DLE, EOT, self.subcommand()]
    }
}

/// # Paper Sensor Query (GS r 1)
///
/// ## Example
///
/// ```
/// use escpos_monitor::protocol::status;
///
/// assert_eq!(status::paper_query(), [0x1D, b'r', 0x01]);
/// ```
#[inline]
pub const fn paper_query() -> [u8; 3] {
    [GS, b'r', 1]
}

/// Interpret a paper sensor reply.
///
/// Paper is present when both bits of [`PAPER_OUT_MASK`] are clear.
#[inline]
pub const fn paper_present(reply: u8) -> bool {
    reply & PAPER_OUT_MASK == 0
}

/// # Status Report
///
/// The three reply bytes collected by one polling session, in query
/// order. Fields that were never answered stay at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Reply to the online query
    pub online: u8,
    /// Reply to the error query; left at 0 when the printer reported OK
    pub error: u8,
    /// Reply to the chute sensor query
    pub chute: u8,
}

impl StatusReport {
    /// The report as the raw `[online, error, chute]` buffer.
    pub const fn as_bytes(&self) -> [u8; 3] {
        [self.online, self.error, self.chute]
    }

    /// Whether the online reply was the OK sentinel.
    pub const fn is_online(&self) -> bool {
        self.online == ONLINE_OK
    }

    /// Summarise the diagnostic part of the report.
    pub fn health(&self) -> Health {
        if self.is_online() {
            Health::Ready
        } else {
            Health::Fault {
                status: self.online,
                code: self.error,
            }
        }
    }
}

impl From<[u8; 3]> for StatusReport {
    fn from(bytes: [u8; 3]) -> Self {
        Self {
            online: bytes[0],
            error: bytes[1],
            chute: bytes[2],
        }
    }
}

/// Aggregate device health derived from a [`StatusReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Health {
    /// Online and healthy
    Ready,
    /// Online query returned something other than OK
    Fault {
        /// Raw online reply
        status: u8,
        /// Reply to the error query
        code: u8,
    },
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Fault { status, code } => {
                write!(f, "fault (status 0x{:02X}, code 0x{:02X})", status, code)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
