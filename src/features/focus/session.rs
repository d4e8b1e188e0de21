//! Focus and break session records.
//!
//! `SessionRecord` is what lands in the log once a session ends.
//! `TimerSession` is the in-flight countdown owned by the timer.

use chrono::{DateTime, Local, NaiveDate, Timelike};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::sound::SoundRequest;
use super::timer::format_duration_mmss;

/// Kind of session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Timed work interval
    Focus,
    /// Timed rest interval
    Break,
}

impl SessionKind {
    /// Parse a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "focus" | "f" | "pomodoro" | "pomo" => Some(Self::Focus),
            "break" | "b" | "rest" => Some(Self::Break),
            _ => None,
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Break => "Break",
        }
    }

    /// Lowercase name used in files and exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Break => "break",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completion {
    /// The countdown reached zero
    Completed,
    /// The session was stopped early
    Cancelled,
}

impl Completion {
    /// Lowercase name used in files and exports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A finished session, as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Focus or break
    pub kind: SessionKind,
    /// When the countdown started
    pub started_at: DateTime<Local>,
    /// When the session reached a terminal state
    pub ended_at: DateTime<Local>,
    /// Duration originally requested, in seconds
    pub planned_duration_seconds: u64,
    /// Time actually spent, in seconds
    pub actual_duration_seconds: u64,
    /// Completed or cancelled
    pub completion: Completion,
    /// Optional note (focus sessions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SessionRecord {
    /// Whether the session ran to zero.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completion == Completion::Completed
    }

    /// A completed focus session is the point where a break is offered.
    #[must_use]
    pub fn suggests_break(&self) -> bool {
        self.kind == SessionKind::Focus && self.is_completed()
    }

    /// Local calendar date the session started on.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.started_at.date_naive()
    }

    /// Check the record invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        if self.planned_duration_seconds == 0 {
            return Err("planned_duration_seconds must be greater than 0".to_string());
        }
        if self.ended_at < self.started_at {
            return Err(format!(
                "ended_at {} is before started_at {}",
                self.ended_at.to_rfc3339(),
                self.started_at.to_rfc3339()
            ));
        }
        Ok(())
    }
}

/// The active countdown. Never persisted mid-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    /// Focus or break
    pub kind: SessionKind,
    /// When the countdown started
    pub started_at: DateTime<Local>,
    /// Requested duration in seconds
    pub planned_duration_seconds: u64,
    /// Seconds added by extensions
    pub extended_seconds: u64,
    /// Seconds left on the clock
    pub remaining_seconds: u64,
    /// Optional note
    pub note: Option<String>,
    /// Ambient sound issued at start
    pub sound_request: Option<SoundRequest>,
}

impl TimerSession {
    /// Create a session starting at `started_at`.
    #[must_use]
    pub fn new(
        kind: SessionKind,
        started_at: DateTime<Local>,
        duration_seconds: u64,
        note: Option<String>,
        sound_request: Option<SoundRequest>,
    ) -> Self {
        let note = match kind {
            SessionKind::Focus => note.filter(|n| !n.trim().is_empty()),
            SessionKind::Break => None,
        };

        Self {
            kind,
            started_at: truncate_to_seconds(started_at),
            planned_duration_seconds: duration_seconds,
            extended_seconds: 0,
            remaining_seconds: duration_seconds,
            note,
            sound_request,
        }
    }

    /// Planned plus extended seconds.
    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        self.planned_duration_seconds.saturating_add(self.extended_seconds)
    }

    /// Seconds counted down so far.
    #[must_use]
    pub const fn elapsed_seconds(&self) -> u64 {
        self.total_seconds().saturating_sub(self.remaining_seconds)
    }

    /// Get progress as a fraction (0.0 - 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 1.0;
        }
        (self.elapsed_seconds() as f64 / total as f64).min(1.0)
    }

    /// Format remaining time as MM:SS.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format_duration_mmss(self.remaining_seconds)
    }

    /// Turn the session into its log record.
    #[must_use]
    pub fn into_record(
        self,
        ended_at: DateTime<Local>,
        actual_duration_seconds: u64,
        completion: Completion,
    ) -> SessionRecord {
        let ended_at = truncate_to_seconds(ended_at).max(self.started_at);
        SessionRecord {
            kind: self.kind,
            started_at: self.started_at,
            ended_at,
            planned_duration_seconds: self.planned_duration_seconds,
            actual_duration_seconds,
            completion,
            note: self.note,
        }
    }
}

/// Drop sub-second precision from a timestamp.
#[must_use]
pub fn truncate_to_seconds(t: DateTime<Local>) -> DateTime<Local> {
    t.with_nanosecond(0).unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn test_session_kind_parse() {
        assert_eq!(SessionKind::parse("focus"), Some(SessionKind::Focus));
        assert_eq!(SessionKind::parse("pomo"), Some(SessionKind::Focus));
        assert_eq!(SessionKind::parse("Break"), Some(SessionKind::Break));
        assert_eq!(SessionKind::parse("nap"), None);
    }

    #[test]
    fn test_break_drops_note() {
        let session = TimerSession::new(
            SessionKind::Break,
            at(9, 0, 0),
            300,
            Some("coffee".to_string()),
            None,
        );
        assert!(session.note.is_none());
    }

    #[test]
    fn test_blank_note_is_none() {
        let session =
            TimerSession::new(SessionKind::Focus, at(9, 0, 0), 1500, Some("  ".to_string()), None);
        assert!(session.note.is_none());
    }

    #[test]
    fn test_started_at_truncated_to_seconds() {
        let started = at(9, 0, 0) + Duration::milliseconds(750);
        let session = TimerSession::new(SessionKind::Focus, started, 60, None, None);
        assert_eq!(session.started_at, at(9, 0, 0));
    }

    #[test]
    fn test_into_record_clamps_end_before_start() {
        let session = TimerSession::new(SessionKind::Focus, at(9, 0, 0), 60, None, None);
        let record = session.into_record(at(8, 59, 0), 0, Completion::Cancelled);
        assert_eq!(record.ended_at, record.started_at);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_record_serialization_shape() {
        let session =
            TimerSession::new(SessionKind::Focus, at(9, 0, 0), 1500, Some("draft".to_string()), None);
        let record = session.into_record(at(9, 25, 0), 1500, Completion::Completed);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["kind"], "focus");
        assert_eq!(value["completion"], "completed");
        assert_eq!(value["planned_duration_seconds"], 1500);
        assert_eq!(value["note"], "draft");
        assert!(value["started_at"].as_str().unwrap().starts_with("2026-03-10T09:00:00"));
    }

    #[test]
    fn test_suggests_break() {
        let focus = TimerSession::new(SessionKind::Focus, at(9, 0, 0), 60, None, None);
        assert!(focus
            .clone()
            .into_record(at(9, 1, 0), 60, Completion::Completed)
            .suggests_break());
        assert!(!focus
            .into_record(at(9, 0, 30), 30, Completion::Cancelled)
            .suggests_break());
    }

    #[test]
    fn test_progress() {
        let mut session = TimerSession::new(SessionKind::Focus, at(9, 0, 0), 100, None, None);
        assert!(session.progress().abs() < f64::EPSILON);
        session.remaining_seconds = 50;
        assert!((session.progress() - 0.5).abs() < 0.01);
        assert_eq!(session.format_remaining(), "00:50");
    }
}
