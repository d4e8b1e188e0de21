//! Timer state machine for focus and break sessions.
//!
//! At most one `TimerSession` lives in the timer's slot. Transitions:
//!
//! ```text
//! Idle -> Running -> Completed -> (complete) record
//!            |  ^
//!            |  +---- Extended (breaks only)
//!            +------> (cancel) Cancelled record
//! ```
//!
//! Each lifecycle yields exactly one `SessionRecord`, from either
//! `complete()` or `cancel()`. Afterwards the slot is empty and a new
//! `start()` is required.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use super::session::{Completion, SessionKind, SessionRecord, TimerSession};
use super::sound::{AmbientSound, SoundRequest};
use crate::error::TomoError;

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// No session has been started
    Idle,
    /// Counting down
    Running,
    /// A break was just extended; becomes `Running` on the next tick
    Extended,
    /// Countdown reached zero
    Completed,
    /// Session was stopped early
    Cancelled,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Extended => "extended",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Source of the current local time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// The focus timer.
pub struct Timer {
    slot: Option<TimerSession>,
    state: TimerState,
    clock: Box<dyn Clock>,
    sound: Box<dyn AmbientSound>,
}

impl Timer {
    /// Create an idle timer.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, sound: Box<dyn AmbientSound>) -> Self {
        Self {
            slot: None,
            state: TimerState::Idle,
            clock,
            sound,
        }
    }

    /// Start a session.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` for a zero duration or an invalid
    /// sound request, and `TomoError::AlreadyRunning` if a session is
    /// active. Neither changes any state.
    pub fn start(
        &mut self,
        kind: SessionKind,
        duration_seconds: u64,
        note: Option<String>,
        sound_request: Option<SoundRequest>,
    ) -> Result<&TimerSession, TomoError> {
        if duration_seconds == 0 {
            return Err(TomoError::Validation(
                "duration must be greater than 0".to_string(),
            ));
        }
        if let Some(request) = &sound_request {
            request.validate()?;
        }
        if let Some(active) = &self.slot {
            return Err(TomoError::AlreadyRunning(active.kind.to_string()));
        }

        let session = TimerSession::new(
            kind,
            self.clock.now(),
            duration_seconds,
            note,
            sound_request,
        );

        if let Some(request) = session.sound_request.filter(|r| !r.is_empty()) {
            if let Err(e) = self.sound.play(&request) {
                tracing::warn!(error = %e, sound = %request.kind, "ambient sound failed to start");
            }
        }

        tracing::debug!(kind = %kind, seconds = duration_seconds, "session started");
        self.state = TimerState::Running;
        Ok(self.slot.insert(session))
    }

    /// Count down by `elapsed_seconds`, clamping at zero.
    ///
    /// Reaching zero moves the timer to `Completed` without any other call.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::InvalidTransition` if no session is active.
    pub fn tick(&mut self, elapsed_seconds: u64) -> Result<TimerState, TomoError> {
        let Some(session) = self.slot.as_mut() else {
            return Err(self.invalid("tick"));
        };
        if self.state == TimerState::Completed {
            return Ok(TimerState::Completed);
        }

        session.remaining_seconds = session.remaining_seconds.saturating_sub(elapsed_seconds);
        self.state = if session.remaining_seconds == 0 {
            tracing::debug!(kind = %session.kind, "countdown reached zero");
            TimerState::Completed
        } else {
            TimerState::Running
        };
        Ok(self.state)
    }

    /// Add time to the active break.
    ///
    /// Allowed while the break is counting down or has reached zero but has
    /// not been completed yet. No record is produced.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` for a zero increment and
    /// `TomoError::InvalidTransition` when no break is active.
    pub fn extend(&mut self, increment_seconds: u64) -> Result<TimerState, TomoError> {
        if increment_seconds == 0 {
            return Err(TomoError::Validation(
                "extension must be greater than 0".to_string(),
            ));
        }
        let state = self.state;
        let Some(session) = self.slot.as_mut() else {
            return Err(self.invalid("extend"));
        };
        if session.kind != SessionKind::Break {
            return Err(TomoError::InvalidTransition {
                state,
                action: "extend a focus session",
            });
        }

        session.remaining_seconds = session.remaining_seconds.saturating_add(increment_seconds);
        session.extended_seconds = session.extended_seconds.saturating_add(increment_seconds);
        tracing::debug!(added = increment_seconds, remaining = session.remaining_seconds, "break extended");
        self.state = TimerState::Extended;
        Ok(self.state)
    }

    /// Stop the active session early and produce its record.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::InvalidTransition` unless the timer is `Running`
    /// or `Extended`.
    pub fn cancel(&mut self) -> Result<SessionRecord, TomoError> {
        if !matches!(self.state, TimerState::Running | TimerState::Extended) {
            return Err(self.invalid("cancel"));
        }
        let Some(session) = self.slot.take() else {
            return Err(self.invalid("cancel"));
        };

        let now = self.clock.now();
        let elapsed = (now - session.started_at).num_seconds();
        let actual = u64::try_from(elapsed).unwrap_or(0);

        self.sound.stop();
        self.state = TimerState::Cancelled;
        tracing::debug!(kind = %session.kind, actual, "session cancelled");
        Ok(session.into_record(now, actual, Completion::Cancelled))
    }

    /// Take the record of a session whose countdown reached zero.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::InvalidTransition` unless the timer is `Completed`
    /// with its session still in the slot.
    pub fn complete(&mut self) -> Result<SessionRecord, TomoError> {
        if self.state != TimerState::Completed {
            return Err(self.invalid("complete"));
        }
        let Some(session) = self.slot.take() else {
            return Err(self.invalid("complete"));
        };

        let actual = session.total_seconds();
        self.sound.stop();
        tracing::debug!(kind = %session.kind, actual, "session completed");
        Ok(session.into_record(self.clock.now(), actual, Completion::Completed))
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// The active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&TimerSession> {
        self.slot.as_ref()
    }

    /// Whether a session occupies the slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    fn invalid(&self, action: &'static str) -> TomoError {
        TomoError::InvalidTransition {
            state: self.state,
            action,
        }
    }
}

/// Format seconds as MM:SS. Minutes keep counting past 99.
#[must_use]
pub fn format_duration_mmss(total_seconds: u64) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

/// Format seconds compactly, e.g. "1h 15m" or "25m".
#[must_use]
pub fn format_seconds_short(seconds: u64) -> String {
    let total_minutes = seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if total_minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{seconds}s")
    }
}

/// Parse a duration string like "25m", "1h30m", "90s".
///
/// A bare number is read as minutes. Values too large to represent are
/// rejected rather than wrapped.
#[must_use]
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    if let Ok(minutes) = s.parse::<i64>() {
        return if minutes > 0 {
            Duration::try_minutes(minutes)
        } else {
            None
        };
    }

    let mut total_seconds: i64 = 0;
    let mut current_num = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            current_num.push(c);
        } else if !current_num.is_empty() {
            let num: i64 = current_num.parse().ok()?;
            current_num.clear();

            let unit = match c {
                'h' => 3600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            total_seconds = total_seconds.checked_add(num.checked_mul(unit)?)?;
        } else if !c.is_whitespace() {
            return None;
        }
    }

    if !current_num.is_empty() {
        let num: i64 = current_num.parse().ok()?;
        total_seconds = total_seconds.checked_add(num.checked_mul(60)?)?;
    }

    if total_seconds > 0 {
        Duration::try_seconds(total_seconds)
    } else {
        None
    }
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * width as f64) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}


#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;
    use crate::features::focus::sound::{MockAmbientSound, Silent, SoundKind};
    use chrono::TimeZone;

    fn start_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn timer_with(clock: &ManualClock) -> Timer {
        Timer::new(Box::new(clock.clone()), Box::new(Silent))
    }

    #[test]
    fn test_start_runs() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);

        let session = timer
            .start(SessionKind::Focus, 1500, Some("write".to_string()), None)
            .unwrap();
        assert_eq!(session.remaining_seconds, 1500);
        assert_eq!(session.started_at, start_time());
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_start_rejects_zero_duration() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);

        let err = timer.start(SessionKind::Focus, 0, None, None).unwrap_err();
        assert!(matches!(err, TomoError::Validation(_)));
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_start_rejects_loud_volume_before_mutation() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        let request = SoundRequest {
            kind: SoundKind::Rain,
            volume: 150,
        };

        let err = timer
            .start(SessionKind::Focus, 60, None, Some(request))
            .unwrap_err();
        assert!(matches!(err, TomoError::Validation(_)));
        assert!(!timer.is_active());
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 60, None, None).unwrap();

        let err = timer.start(SessionKind::Break, 60, None, None).unwrap_err();
        assert!(matches!(err, TomoError::AlreadyRunning(_)));
        assert_eq!(timer.session().unwrap().kind, SessionKind::Focus);
    }

    #[test]
    fn test_tick_reaches_completed() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 3, None, None).unwrap();

        assert_eq!(timer.tick(1).unwrap(), TimerState::Running);
        assert_eq!(timer.tick(1).unwrap(), TimerState::Running);
        assert_eq!(timer.tick(1).unwrap(), TimerState::Completed);
        assert_eq!(timer.tick(1).unwrap(), TimerState::Completed);
        assert_eq!(timer.session().unwrap().remaining_seconds, 0);
    }

    #[test]
    fn test_ticks_are_additive() {
        let clock = ManualClock::new(start_time());
        let mut split = timer_with(&clock);
        let mut whole = timer_with(&clock);
        split.start(SessionKind::Focus, 100, None, None).unwrap();
        whole.start(SessionKind::Focus, 100, None, None).unwrap();

        for step in [3, 10, 0, 7, 20] {
            split.tick(step).unwrap();
        }
        whole.tick(40).unwrap();

        assert_eq!(
            split.session().unwrap().remaining_seconds,
            whole.session().unwrap().remaining_seconds
        );
    }

    #[test]
    fn test_tick_clamps_at_zero() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 10, None, None).unwrap();

        assert_eq!(timer.tick(500).unwrap(), TimerState::Completed);
        assert_eq!(timer.session().unwrap().remaining_seconds, 0);
    }

    #[test]
    fn test_tick_on_idle_is_invalid() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        assert!(matches!(
            timer.tick(1),
            Err(TomoError::InvalidTransition {
                state: TimerState::Idle,
                ..
            })
        ));
    }

    #[test]
    fn test_complete_records_planned_duration() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer
            .start(SessionKind::Focus, 1500, Some("report".to_string()), None)
            .unwrap();
        timer.tick(1500).unwrap();
        clock.advance(1502);

        let record = timer.complete().unwrap();
        assert_eq!(record.completion, Completion::Completed);
        assert_eq!(record.actual_duration_seconds, 1500);
        assert_eq!(record.planned_duration_seconds, 1500);
        assert_eq!(record.note.as_deref(), Some("report"));
        assert_eq!(record.ended_at, start_time() + Duration::seconds(1502));
        assert!(!timer.is_active());
        assert_eq!(timer.state(), TimerState::Completed);
    }

    #[test]
    fn test_complete_before_zero_is_invalid() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 60, None, None).unwrap();
        timer.tick(30).unwrap();

        assert!(matches!(
            timer.complete(),
            Err(TomoError::InvalidTransition { .. })
        ));
        assert!(timer.is_active());
    }

    #[test]
    fn test_exactly_one_record_per_lifecycle() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 5, None, None).unwrap();
        timer.tick(5).unwrap();

        assert!(timer.complete().is_ok());
        assert!(timer.complete().is_err());
        assert!(timer.cancel().is_err());
    }

    #[test]
    fn test_cancel_immediately_after_start() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 1500, None, None).unwrap();

        let record = timer.cancel().unwrap();
        assert_eq!(record.completion, Completion::Cancelled);
        assert_eq!(record.actual_duration_seconds, 0);
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_cancel_uses_wall_clock() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 1500, None, None).unwrap();
        timer.tick(600).unwrap();
        clock.advance(615);

        let record = timer.cancel().unwrap();
        assert_eq!(record.actual_duration_seconds, 615);
        assert_eq!(record.planned_duration_seconds, 1500);
    }

    #[test]
    fn test_cancel_on_idle_is_invalid() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        assert!(matches!(
            timer.cancel(),
            Err(TomoError::InvalidTransition { action: "cancel", .. })
        ));
    }

    #[test]
    fn test_extend_break_at_zero() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Break, 300, None, None).unwrap();
        assert_eq!(timer.tick(300).unwrap(), TimerState::Completed);

        assert_eq!(timer.extend(300).unwrap(), TimerState::Extended);
        assert_eq!(timer.session().unwrap().remaining_seconds, 300);
        assert_eq!(timer.tick(100).unwrap(), TimerState::Running);
        assert_eq!(timer.tick(200).unwrap(), TimerState::Completed);

        let record = timer.complete().unwrap();
        assert_eq!(record.planned_duration_seconds, 300);
        assert_eq!(record.actual_duration_seconds, 600);
    }

    #[test]
    fn test_cancel_from_extended() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Break, 60, None, None).unwrap();
        timer.tick(50).unwrap();
        timer.extend(60).unwrap();
        clock.advance(70);

        let record = timer.cancel().unwrap();
        assert_eq!(record.completion, Completion::Cancelled);
        assert_eq!(record.actual_duration_seconds, 70);
    }

    #[test]
    fn test_extend_focus_is_invalid() {
        let clock = ManualClock::new(start_time());
        let mut timer = timer_with(&clock);
        timer.start(SessionKind::Focus, 60, None, None).unwrap();

        assert!(matches!(
            timer.extend(300),
            Err(TomoError::InvalidTransition { .. })
        ));
        assert_eq!(timer.session().unwrap().remaining_seconds, 60);
    }

    #[test]
    fn test_sound_played_and_stopped() {
        let clock = ManualClock::new(start_time());
        let mut sound = MockAmbientSound::new();
        sound
            .expect_play()
            .withf(|r| r.kind == SoundKind::Rain && r.volume == 30)
            .times(1)
            .returning(|_| Ok(()));
        sound.expect_stop().times(1).return_const(());

        let mut timer = Timer::new(Box::new(clock), Box::new(sound));
        let request = SoundRequest::new(SoundKind::Rain, 30).unwrap();
        timer
            .start(SessionKind::Focus, 10, None, Some(request))
            .unwrap();
        timer.tick(10).unwrap();
        timer.complete().unwrap();
    }

    #[test]
    fn test_empty_sound_request_not_issued() {
        let clock = ManualClock::new(start_time());
        let mut sound = MockAmbientSound::new();
        sound.expect_play().times(0);
        sound.expect_stop().return_const(());

        let mut timer = Timer::new(Box::new(clock), Box::new(sound));
        let request = SoundRequest::new(SoundKind::None, 50).unwrap();
        timer.start(SessionKind::Focus, 10, None, Some(request)).unwrap();
        timer.cancel().unwrap();
    }

    #[test]
    fn test_sound_failure_is_not_fatal() {
        let clock = ManualClock::new(start_time());
        let mut sound = MockAmbientSound::new();
        sound
            .expect_play()
            .returning(|_| Err(TomoError::Config("no audio device".to_string())));
        sound.expect_stop().return_const(());

        let mut timer = Timer::new(Box::new(clock), Box::new(sound));
        let request = SoundRequest::new(SoundKind::WhiteNoise, 50).unwrap();
        assert!(timer
            .start(SessionKind::Focus, 10, None, Some(request))
            .is_ok());
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_mock_clock_sets_start() {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(start_time());

        let mut timer = Timer::new(Box::new(clock), Box::new(Silent));
        let session = timer.start(SessionKind::Break, 300, None, None).unwrap();
        assert_eq!(session.started_at, start_time());
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("25"), Some(Duration::minutes(25)));
        assert_eq!(parse_duration("25m"), Some(Duration::minutes(25)));
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("1h"), Some(Duration::hours(1)));
        assert_eq!(parse_duration("2h30m"), Some(Duration::minutes(150)));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("90s"), Some(Duration::seconds(90)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::seconds(90)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_none());
        assert!(parse_duration("abc").is_none());
        assert!(parse_duration("0").is_none());
        assert!(parse_duration("-5").is_none());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        assert!(parse_duration("99999999999999999").is_none());
        assert!(parse_duration("99999999999999999h").is_none());
        assert!(parse_duration("9223372036854775807s").is_none());
        assert!(parse_duration("2562047788015215h1h").is_none());
    }

    #[test]
    fn test_format_seconds_short() {
        assert_eq!(format_seconds_short(4500), "1h 15m");
        assert_eq!(format_seconds_short(1500), "25m");
        assert_eq!(format_seconds_short(42), "42s");
    }

    #[test]
    fn test_format_duration_mmss() {
        assert_eq!(format_duration_mmss(1500), "25:00");
        assert_eq!(format_duration_mmss(90), "01:30");
        assert_eq!(format_duration_mmss(0), "00:00");
        assert_eq!(format_duration_mmss(7200), "120:00");
    }

    #[test]
    fn test_render_progress_bar() {
        let bar = render_progress_bar(0.5, 10);
        assert!(bar.contains("█████"));
        assert!(bar.contains("░░░░░"));
    }
}
