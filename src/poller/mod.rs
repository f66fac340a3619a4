//! # Status Poller
//!
//! Non-blocking, tick-driven state machine that asks the printer whether
//! it is online, which fault it reports if it is not, and what its chute
//! (paper-path) sensor says.
//!
//! ## Calling Convention
//!
//! The caller owns a [`PollSession`] and the transport, and calls [`poll`]
//! once per iteration of its own loop, feeding back the code returned by
//! the previous call:
//!
//! | Returned code      | Meaning |
//! |--------------------|---------|
//! | same as input      | still waiting, nothing new |
//! | input + 1          | the error code or the chute byte was read |
//! | [`TIMEOUT_CODE`]   | no reply in time, session reset to idle |
//!
//! An OK online reply moves straight on to the chute query without
//! changing the code. A session started with code `c` therefore ends at
//! `c + 1` on the OK path and `c + 2` on the fault path. The pass is over
//! when a call changes the code and leaves the session idle. Each call
//! does O(1) transport polling and returns immediately.
//!
//! ## Stages
//!
//! ```text
//! Start ─► GraceOnline ─► WaitOnline ──(0x16)──────────────────► StartChute
//!                             │                                     │
//!                             └─(other)─► GraceError ─► WaitError ──┘
//!
//! StartChute ─► GraceChute ─► WaitChute ─► Start
//! ```
//!
//! ## Example
//!
//! ```
//! use escpos_monitor::poller::{self, PollSession, Stage};
//! use escpos_monitor::printer::PollConfig;
//! use escpos_monitor::transport::MockTransport;
//!
//! let config = PollConfig::default();
//! let mut transport = MockTransport::new();
//! let mut session = PollSession::new();
//!
//! let mut code = poller::poll(&mut session, &mut transport, &config, 0, 0)?;
//! assert_eq!(code, 0);
//! assert_eq!(transport.written(), &[0x10, 0x04, 0x01]);
//!
//! // Reply arrives after the grace period
//! transport.push_rx(&[0x16]);
//! code = poller::poll(&mut session, &mut transport, &config, 10, code)?;
//! code = poller::poll(&mut session, &mut transport, &config, 11, code)?;
//! assert_eq!(code, 0);
//! assert_eq!(session.results().online, 0x16);
//! assert_eq!(session.stage(), Stage::StartChute);
//! # Ok::<(), escpos_monitor::error::MonitorError>(())
//! ```

pub mod clock;
pub mod paper;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use paper::has_paper;

use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::printer::PollConfig;
use crate::protocol::status::{ONLINE_OK, StatusQuery, StatusReport};
use crate::transport::Transport;

/// Returned by [`poll`] when a reply did not arrive in time.
pub const TIMEOUT_CODE: i32 = -99;

/// One node of the polling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Idle; the next poll flushes rx and sends the online query
    #[default]
    Start,
    GraceOnline,
    WaitOnline,
    GraceError,
    WaitError,
    /// Sends the chute sensor query
    StartChute,
    GraceChute,
    WaitChute,
}

impl Stage {
    /// The stage that follows in the linear sequence.
    pub const fn next(self) -> Self {
        match self {
            Self::Start => Self::GraceOnline,
            Self::GraceOnline => Self::WaitOnline,
            Self::WaitOnline => Self::GraceError,
            Self::GraceError => Self::WaitError,
            Self::WaitError => Self::StartChute,
            Self::StartChute => Self::GraceChute,
            Self::GraceChute => Self::WaitChute,
            Self::WaitChute => Self::Start,
        }
    }

    /// Whether this stage consumes a reply byte.
    pub const fn awaits_reply(self) -> bool {
        matches!(self, Self::WaitOnline | Self::WaitError | Self::WaitChute)
    }

    fn query(self) -> &'static str {
        match self {
            Self::Start | Self::GraceOnline | Self::WaitOnline => "online",
            Self::GraceError | Self::WaitError => "error",
            Self::StartChute | Self::GraceChute | Self::WaitChute => "chute",
        }
    }
}

/// # Poll Session
///
/// State of one diagnostic pass. Created idle; reset to idle after the
/// last stage completes or a reply times out. `results` keeps the bytes
/// of the most recent pass until the next pass starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSession {
    stage: Stage,
    stage_started_at: u64,
    results: StatusReport,
}

impl PollSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Tick at which the current stage began waiting.
    pub fn stage_started_at(&self) -> u64 {
        self.stage_started_at
    }

    pub fn results(&self) -> &StatusReport {
        &self.results
    }

    /// True when the next [`poll`] would begin a fresh pass.
    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Start
    }

    /// Abandon any pass in progress. Results are kept.
    pub fn reset(&mut self) {
        self.stage = Stage::Start;
    }

    fn enter(&mut self, stage: Stage, now: u64) {
        self.stage = stage;
        self.stage_started_at = now;
    }

    fn send<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        query: StatusQuery,
        now: u64,
    ) -> Result<()> {
        if let Err(e) = transport.write(&query.command()) {
            self.reset();
            return Err(e);
        }
        self.enter(self.stage.next(), now);
        Ok(())
    }
}

/// Outcome of checking a wait stage for its reply.
enum Reply {
    Byte(u8),
    Pending,
    TimedOut,
}

fn take_reply<T: Transport + ?Sized>(
    session: &PollSession,
    transport: &mut T,
    config: &PollConfig,
    now: u64,
) -> Reply {
    if transport.available() > 0 {
        if let Some(byte) = transport.read_byte() {
            return Reply::Byte(byte);
        }
    }
    if now.saturating_sub(session.stage_started_at) > config.reply_timeout_ms {
        Reply::TimedOut
    } else {
        Reply::Pending
    }
}

/// Return `stage.next()` once `duration` ticks have passed since
/// `started_at`, otherwise `stage` unchanged.
#[inline]
pub fn advance_after(started_at: u64, duration: u64, now: u64, stage: Stage) -> Stage {
    if now.saturating_sub(started_at) >= duration {
        stage.next()
    } else {
        stage
    }
}

/// Discard every byte currently waiting in the transport's rx buffer.
///
/// Returns the number of bytes discarded. Bytes arriving while this runs
/// are left alone.
pub fn flush_rx<T: Transport + ?Sized>(transport: &mut T) -> usize {
    let pending = transport.available();
    let mut discarded = 0;
    for _ in 0..pending {
        if transport.read_byte().is_none() {
            break;
        }
        discarded += 1;
    }
    discarded
}

/// Advance the status session by at most one stage.
///
/// `now` is the current tick from a monotonic [`Clock`]; `stage_in` is the
/// code returned by the previous call. See the module docs for the
/// meaning of the returned code.
///
/// ## Errors
///
/// Only transport write failures are errors. The session is reset to idle
/// before the error is returned.
pub fn poll<T: Transport + ?Sized>(
    session: &mut PollSession,
    transport: &mut T,
    config: &PollConfig,
    now: u64,
    stage_in: i32,
) -> Result<i32> {
    let mut stage_out = stage_in;

    match session.stage {
        Stage::Start => {
            let flushed = flush_rx(transport);
            if flushed > 0 {
                tracing::debug!(flushed, "discarded stale bytes before status query");
            }
            session.results = StatusReport::default();
            session.send(transport, StatusQuery::Online, now)?;
        }

        Stage::GraceOnline | Stage::GraceError | Stage::GraceChute => {
            let next = advance_after(
                session.stage_started_at,
                config.grace_period_ms,
                now,
                session.stage,
            );
            if next != session.stage {
                session.enter(next, now);
            }
        }

        Stage::WaitOnline => match take_reply(session, transport, config, now) {
            Reply::Byte(byte) => {
                tracing::debug!("online status 0x{:02X}", byte);
                session.results.online = byte;
                if byte == ONLINE_OK {
                    session.enter(Stage::StartChute, now);
                } else {
                    session.send(transport, StatusQuery::Error, now)?;
                }
            }
            Reply::Pending => {}
            Reply::TimedOut => stage_out = time_out(session),
        },

        Stage::WaitError => match take_reply(session, transport, config, now) {
            Reply::Byte(byte) => {
                tracing::debug!("error code 0x{:02X}", byte);
                session.results.error = byte;
                session.enter(Stage::StartChute, now);
                stage_out = stage_in.saturating_add(1);
            }
            Reply::Pending => {}
            Reply::TimedOut => stage_out = time_out(session),
        },

        Stage::StartChute => {
            session.send(transport, StatusQuery::Chute, now)?;
        }

        Stage::WaitChute => match take_reply(session, transport, config, now) {
            Reply::Byte(byte) => {
                tracing::debug!("chute status 0x{:02X}", byte);
                session.results.chute = byte;
                session.reset();
                stage_out = stage_in.saturating_add(1);
            }
            Reply::Pending => {}
            Reply::TimedOut => stage_out = time_out(session),
        },
    }

    Ok(stage_out)
}

fn time_out(session: &mut PollSession) -> i32 {
    tracing::warn!(
        "no answer to {} status query, printer not responding",
        session.stage.query()
    );
    session.reset();
    TIMEOUT_CODE
}

/// Final result of a session driven by [`run_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every stage answered
    Complete(StatusReport),
    /// A stage timed out; fields after the failing stage are still 0
    TimedOut(StatusReport),
}

/// Drive a full session to completion, sleeping `tick` between polls.
///
/// This blocks the caller for at most a few reply timeouts and is meant
/// for one-shot tools. Applications with their own loop should call
/// [`poll`] directly.
pub fn run_session<T, C>(
    session: &mut PollSession,
    transport: &mut T,
    config: &PollConfig,
    clock: &C,
    tick: Duration,
) -> Result<SessionOutcome>
where
    T: Transport + ?Sized,
    C: Clock + ?Sized,
{
    session.reset();
    let mut code = 0;
    loop {
        let next = poll(session, transport, config, clock.now_ms(), code)?;
        if next == TIMEOUT_CODE {
            return Ok(SessionOutcome::TimedOut(session.results));
        }
        if next != code && session.is_idle() {
            return Ok(SessionOutcome::Complete(session.results));
        }
        code = next;
        if !tick.is_zero() {
            thread::sleep(tick);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn config() -> PollConfig {
        PollConfig::default()
    }

    #[test]
    fn test_stage_sequence() {
        let mut stage = Stage::Start;
        let mut seen = vec![stage];
        for _ in 0..7 {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(seen.last(), Some(&Stage::WaitChute));
        assert_eq!(Stage::WaitChute.next(), Stage::Start);
        assert_eq!(seen.iter().filter(|s| s.awaits_reply()).count(), 3);
    }

    #[test]
    fn test_advance_after() {
        assert_eq!(advance_after(100, 10, 105, Stage::GraceOnline), Stage::GraceOnline);
        assert_eq!(advance_after(100, 10, 110, Stage::GraceOnline), Stage::WaitOnline);
        assert_eq!(advance_after(100, 10, 500, Stage::GraceChute), Stage::WaitChute);
        // Zero grace advances immediately
        assert_eq!(advance_after(7, 0, 7, Stage::GraceError), Stage::WaitError);
    }

    #[test]
    fn test_flush_rx() {
        let mut transport = MockTransport::with_pending(&[1, 2, 3]);
        assert_eq!(flush_rx(&mut transport), 3);
        assert_eq!(transport.pending(), 0);
        assert_eq!(flush_rx(&mut transport), 0);
    }

    #[test]
    fn test_start_sends_online_query() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();

        let code = poll(&mut session, &mut transport, &config(), 42, 0).unwrap();

        assert_eq!(code, 0);
        assert_eq!(transport.written(), &[0x10, 0x04, 0x01]);
        assert_eq!(session.stage(), Stage::GraceOnline);
        assert_eq!(session.stage_started_at(), 42);
    }

    #[test]
    fn test_grace_ignores_early_reply() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();
        poll(&mut session, &mut transport, &config(), 0, 0).unwrap();

        transport.push_rx(&[0x16]);
        let code = poll(&mut session, &mut transport, &config(), 5, 0).unwrap();

        assert_eq!(code, 0);
        assert_eq!(session.stage(), Stage::GraceOnline);
        assert_eq!(transport.pending(), 1);
    }

    #[test]
    fn test_grace_error_ignores_early_reply() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();
        poll(&mut session, &mut transport, &config(), 0, 0).unwrap();
        poll(&mut session, &mut transport, &config(), 10, 0).unwrap();
        transport.push_rx(&[0x3F]);
        poll(&mut session, &mut transport, &config(), 11, 0).unwrap();
        assert_eq!(session.stage(), Stage::GraceError);

        transport.push_rx(&[0x02]);
        let code = poll(&mut session, &mut transport, &config(), 15, 0).unwrap();

        assert_eq!(code, 0);
        assert_eq!(session.stage(), Stage::GraceError);
        assert_eq!(session.results().error, 0);
        assert_eq!(transport.pending(), 1);
    }

    #[test]
    fn test_grace_chute_ignores_early_reply() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();
        poll(&mut session, &mut transport, &config(), 0, 0).unwrap();
        poll(&mut session, &mut transport, &config(), 10, 0).unwrap();
        transport.push_rx(&[0x16]);
        poll(&mut session, &mut transport, &config(), 11, 0).unwrap();
        poll(&mut session, &mut transport, &config(), 12, 0).unwrap();
        assert_eq!(session.stage(), Stage::GraceChute);

        transport.push_rx(&[0x12]);
        let code = poll(&mut session, &mut transport, &config(), 20, 0).unwrap();

        assert_eq!(code, 0);
        assert_eq!(session.stage(), Stage::GraceChute);
        assert_eq!(session.results().chute, 0);
        assert_eq!(transport.pending(), 1);
    }

    #[test]
    fn test_ok_reply_keeps_code_until_chute_answers() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();
        poll(&mut session, &mut transport, &config(), 0, 3).unwrap();
        poll(&mut session, &mut transport, &config(), 10, 3).unwrap();

        transport.push_rx(&[0x16]);
        let code = poll(&mut session, &mut transport, &config(), 11, 3).unwrap();
        assert_eq!(code, 3);
        assert_eq!(session.stage(), Stage::StartChute);
        assert_eq!(session.results().as_bytes(), [0x16, 0x00, 0x00]);

        poll(&mut session, &mut transport, &config(), 12, 3).unwrap();
        poll(&mut session, &mut transport, &config(), 22, 3).unwrap();
        transport.push_rx(&[0x12]);
        let code = poll(&mut session, &mut transport, &config(), 23, 3).unwrap();
        assert_eq!(code, 4);
        assert!(session.is_idle());
        assert_eq!(session.results().chute, 0x12);
    }

    #[test]
    fn test_wait_timer_restarts_after_grace() {
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();
        poll(&mut session, &mut transport, &config(), 0, 0).unwrap();
        poll(&mut session, &mut transport, &config(), 50, 0).unwrap();
        assert_eq!(session.stage(), Stage::WaitOnline);
        assert_eq!(session.stage_started_at(), 50);

        // 200 ticks after entering the wait stage is still within the window
        let code = poll(&mut session, &mut transport, &config(), 250, 0).unwrap();
        assert_eq!(code, 0);
        let code = poll(&mut session, &mut transport, &config(), 251, 0).unwrap();
        assert_eq!(code, TIMEOUT_CODE);
        assert!(session.is_idle());
    }

    #[test]
    fn test_write_failure_resets_session() {
        let mut transport = MockTransport::new();
        transport.set_fail_writes(true);
        let mut session = PollSession::new();

        assert!(poll(&mut session, &mut transport, &config(), 0, 0).is_err());
        assert!(session.is_idle());
    }

    #[test]
    fn test_run_session_with_prequeued_replies() {
        let config = PollConfig {
            grace_period_ms: 0,
            ..PollConfig::default()
        };
        let clock = ManualClock::new();
        let mut transport = MockTransport::new();
        let mut session = PollSession::new();

        // Start flushes whatever is queued, so nothing is answered.
        transport.push_rx(&[0x16, 0x20]);
        let outcome = run_session(
            &mut session,
            &mut transport,
            &config,
            &TickingClock(&clock),
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(outcome, SessionOutcome::TimedOut(StatusReport::default()));
    }

    #[test]
    fn test_run_session_completes_on_chute_reply() {
        let config = PollConfig {
            grace_period_ms: 0,
            ..PollConfig::default()
        };
        let clock = ManualClock::new();
        let mut transport = ScriptedReplies {
            link: MockTransport::new(),
            replies: vec![0x16, 0x12],
        };
        let mut session = PollSession::new();

        let outcome = run_session(
            &mut session,
            &mut transport,
            &config,
            &TickingClock(&clock),
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(outcome, SessionOutcome::Complete(StatusReport::from([0x16, 0x00, 0x12])));
        assert_eq!(transport.link.writes().len(), 2);
    }

    /// Answers each write with the next scripted byte.
    struct ScriptedReplies {
        link: MockTransport,
        replies: Vec<u8>,
    }

    impl Transport for ScriptedReplies {
        fn write(&mut self, data: &[u8]) -> Result<()> {
            self.link.write(data)?;
            if !self.replies.is_empty() {
                let byte = self.replies.remove(0);
                self.link.push_rx(&[byte]);
            }
            Ok(())
        }

        fn available(&mut self) -> usize {
            self.link.available()
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.link.read_byte()
        }
    }

    /// Clock that moves forward by one tick on every read.
    struct TickingClock<'a>(&'a ManualClock);

    impl Clock for TickingClock<'_> {
        fn now_ms(&self) -> u64 {
            self.0.advance(1);
            self.0.now_ms()
        }
    }
}
