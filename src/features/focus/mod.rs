//! Focus and break sessions.
//!
//! Provides the timer behind every session:
//! - Session records and the in-flight countdown
//! - The timer state machine (start, tick, extend, cancel, complete)
//! - The one-second countdown loop with cancellation
//! - Ambient sound requests

pub mod countdown;
pub mod session;
pub mod sound;
pub mod timer;

pub use countdown::{
    cancel_on_interrupt, default_ticks, run_countdown, CancellationToken, Control, SleepTicks,
    TerminalTicks, Tick, TickSource,
};
pub use session::{Completion, SessionKind, SessionRecord, TimerSession};
pub use sound::{AmbientSound, Silent, SoundKind, SoundRequest, TerminalBell};
pub use timer::{
    format_duration_mmss, format_seconds_short, parse_duration, render_progress_bar, Clock,
    SystemClock, Timer, TimerState,
};
