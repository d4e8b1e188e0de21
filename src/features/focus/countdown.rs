//! The one-second countdown loop.
//!
//! The loop blocks on a `TickSource` for about a second, applies the elapsed
//! time to the timer, and checks a `CancellationToken` at every tick
//! boundary. It returns once the timer has produced its record.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::session::{SessionKind, SessionRecord, TimerSession};
use super::timer::{Timer, TimerState};
use crate::error::TomoError;

/// Length of one tick.
pub const TICK: Duration = Duration::from_secs(1);

/// Shared cancellation flag, checked at each tick boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create an unset token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Further calls have no extra effect.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear an earlier request before the next session.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Cancel `token` on SIGINT, SIGTERM or SIGHUP instead of exiting.
///
/// A process can only have one handler, so install it once and reuse the
/// token for every session.
///
/// # Errors
///
/// Returns `TomoError::Terminal` if the handler cannot be installed.
pub fn cancel_on_interrupt(token: &CancellationToken) -> Result<(), TomoError> {
    let token = token.clone();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|e| TomoError::Terminal(format!("Failed to install interrupt handler: {e}")))
}

/// User control read during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stop the session
    Cancel,
    /// Add time to a break
    Extend,
}

/// Result of waiting for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    /// Whole seconds that passed
    pub elapsed_seconds: u64,
    /// Control pressed during the wait, if any
    pub control: Option<Control>,
}

/// Something that blocks for about one tick.
pub trait TickSource {
    /// Wait for the next tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input fails.
    fn wait(&mut self) -> Result<Tick, TomoError>;
}

/// Carries sub-second remainders between ticks so no time is lost.
#[derive(Debug)]
struct ElapsedCarry {
    last: Instant,
    carry: Duration,
}

impl ElapsedCarry {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    fn take_seconds(&mut self) -> u64 {
        let now = Instant::now();
        self.carry += now.duration_since(self.last);
        self.last = now;
        let seconds = self.carry.as_secs();
        self.carry -= Duration::from_secs(seconds);
        seconds
    }
}

/// Plain sleeping ticks, for when stdin is not a terminal.
#[derive(Debug)]
pub struct SleepTicks {
    clock: ElapsedCarry,
}

impl SleepTicks {
    /// Create a sleeping tick source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: ElapsedCarry::new(),
        }
    }
}

impl Default for SleepTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for SleepTicks {
    fn wait(&mut self) -> Result<Tick, TomoError> {
        std::thread::sleep(TICK);
        Ok(Tick {
            elapsed_seconds: self.clock.take_seconds(),
            control: None,
        })
    }
}

/// Key-polling ticks in raw mode.
///
/// `q`, Esc and Ctrl+C cancel; `e` extends. Raw mode is left on drop.
#[derive(Debug)]
pub struct TerminalTicks {
    clock: ElapsedCarry,
}

impl TerminalTicks {
    /// Switch the terminal to raw mode and start reading keys.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Terminal` if raw mode cannot be enabled.
    pub fn new() -> Result<Self, TomoError> {
        enable_raw_mode().map_err(|e| TomoError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        Ok(Self {
            clock: ElapsedCarry::new(),
        })
    }
}

impl Drop for TerminalTicks {
    fn drop(&mut self) {
        disable_raw_mode().ok();
    }
}

impl TickSource for TerminalTicks {
    fn wait(&mut self) -> Result<Tick, TomoError> {
        let deadline = Instant::now() + TICK;
        let mut control = None;

        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            if !event::poll(left).map_err(|e| TomoError::Terminal(format!("Event poll failed: {e}")))? {
                break;
            }
            if let Event::Key(key) =
                event::read().map_err(|e| TomoError::Terminal(format!("Event read failed: {e}")))?
            {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    control = Some(Control::Cancel);
                    break;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        control = Some(Control::Cancel);
                        break;
                    }
                    KeyCode::Char('e') => {
                        control = Some(Control::Extend);
                        break;
                    }
                    _ => {}
                }
            }
        }

        Ok(Tick {
            elapsed_seconds: self.clock.take_seconds(),
            control,
        })
    }
}

/// Pick the tick source for the current process.
#[must_use]
pub fn default_ticks() -> Box<dyn TickSource> {
    if std::io::stdin().is_terminal() {
        match TerminalTicks::new() {
            Ok(ticks) => return Box::new(ticks),
            Err(e) => tracing::warn!(error = %e, "falling back to plain ticks"),
        }
    }
    Box::new(SleepTicks::new())
}

/// Drive the active session until it yields its record.
///
/// `on_tick` sees the session after every tick for rendering. An input
/// failure cancels the session so its record is still produced.
///
/// # Errors
///
/// Returns `TomoError::InvalidTransition` if no session is active.
pub fn run_countdown<F>(
    timer: &mut Timer,
    ticks: &mut dyn TickSource,
    token: &CancellationToken,
    extend_increment_seconds: u64,
    mut on_tick: F,
) -> Result<SessionRecord, TomoError>
where
    F: FnMut(&TimerSession, TimerState),
{
    if !timer.is_active() {
        return Err(TomoError::InvalidTransition {
            state: timer.state(),
            action: "run a countdown",
        });
    }

    loop {
        if token.is_cancelled() {
            return timer.cancel();
        }
        if timer.state() == TimerState::Completed {
            return timer.complete();
        }

        let tick = match ticks.wait() {
            Ok(tick) => tick,
            Err(e) => {
                tracing::warn!(error = %e, "input failed, cancelling session");
                token.cancel();
                continue;
            }
        };

        match tick.control {
            Some(Control::Cancel) => token.cancel(),
            Some(Control::Extend) => extend(timer, extend_increment_seconds),
            None => {}
        }

        if token.is_cancelled() {
            continue;
        }

        let state = timer.tick(tick.elapsed_seconds)?;
        if let Some(session) = timer.session() {
            on_tick(session, state);
        }
    }
}

fn extend(timer: &mut Timer, increment_seconds: u64) {
    let is_break = timer.session().is_some_and(|s| s.kind == SessionKind::Break);
    if !is_break {
        tracing::debug!("extend ignored outside a break");
        return;
    }
    if let Err(e) = timer.extend(increment_seconds) {
        tracing::warn!(error = %e, "could not extend break");
    }
}
