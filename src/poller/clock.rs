//! # Tick Sources
//!
//! The poller only needs a monotonic millisecond counter; it never looks
//! at wall-clock time.

use std::cell::Cell;
use std::time::Instant;

/// Monotonic millisecond tick source.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Must never go backwards.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`], counting from its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven [`Clock`] for tests and simulations.
///
/// ## Example
///
/// ```
/// use escpos_monitor::poller::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(15);
/// assert_eq!(clock.now_ms(), 15);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    /// Move time forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get().saturating_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
