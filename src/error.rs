//! Error types for tomo.

use std::path::PathBuf;

use thiserror::Error;

use crate::features::focus::{SessionRecord, TimerState};

/// Errors produced by tomo.
#[derive(Debug, Error)]
pub enum TomoError {
    /// A session was started while another one is active.
    #[error("A {0} session is already running")]
    AlreadyRunning(String),

    /// A timer transition was requested from a state that does not allow it.
    #[error("Cannot {action} while the timer is {state}")]
    InvalidTransition {
        /// State the timer was in.
        state: TimerState,
        /// Transition that was attempted.
        action: &'static str,
    },

    /// The persistence medium could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved in the failed operation.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Existing session data could not be parsed.
    #[error("Session log {} is corrupt: {message}", path.display())]
    Corrupt {
        /// File holding the bad data.
        path: PathBuf,
        /// What went wrong, including the entry index when known.
        message: String,
    },

    /// Invalid input (durations, volume, date ranges).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A finished session could not be appended to the log.
    #[error("{} session from {} was not saved: {source}{}", record.kind, record.started_at.format("%Y-%m-%d %H:%M"), spilled_hint(spilled_to.as_ref()))]
    Unsaved {
        /// The record that is still waiting to be written.
        record: Box<SessionRecord>,
        /// Pending file the record was written to, if that worked.
        spilled_to: Option<PathBuf>,
        /// Why the append failed.
        #[source]
        source: Box<TomoError>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal setup or input failed.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TomoError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the same operation could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

fn spilled_hint(path: Option<&PathBuf>) -> String {
    path.map_or_else(
        || " (record kept in memory only)".to_string(),
        |p| format!(" (kept in {}, it will be merged on the next run)", p.display()),
    )
}
