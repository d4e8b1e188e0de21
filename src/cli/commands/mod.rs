//! Command implementations for tomo.
//!
//! This module contains the implementation of all CLI commands. Each
//! command returns the text to print; the binary prints it.

mod completions;
mod config;
mod export;
mod focus;
mod history;
mod stats;

pub use completions::completions;
pub use config::config;
pub use export::export;
pub use focus::{start, take_break};
pub use history::history;
pub use stats::stats;

use chrono::NaiveDate;

use crate::cli::args::FilterArgs;
use crate::config::Paths;
use crate::core::{parse_date, SessionFilter};
use crate::error::TomoError;
use crate::storage::SessionRecorder;

/// Merge sessions left over from a failed save into the log.
///
/// A failure here is logged and left for the next run; the command itself
/// surfaces any problem with the log.
pub fn merge_pending(paths: &Paths) {
    match SessionRecorder::from_paths(paths).flush_pending() {
        Ok(0) => {}
        Ok(added) => tracing::info!(added, "recovered pending sessions"),
        Err(e) => tracing::warn!(error = %e, "could not merge pending sessions"),
    }
}

/// Build a session filter from command-line flags.
///
/// # Errors
///
/// Returns `TomoError::Validation` for an unparseable date or a range that
/// ends before it starts.
pub fn build_filter(args: &FilterArgs, today: NaiveDate) -> Result<SessionFilter, TomoError> {
    let date = |input: &Option<String>| {
        input
            .as_deref()
            .map(|s| {
                parse_date(s, today).ok_or_else(|| {
                    TomoError::Validation(format!(
                        "invalid date '{s}' (try YYYY-MM-DD, today, monday or 7d)"
                    ))
                })
            })
            .transpose()
    };

    let filter = SessionFilter {
        kind: args.kind,
        from: date(&args.from)?,
        to: date(&args.to)?,
    };
    filter.validate()?;
    Ok(filter)
}
