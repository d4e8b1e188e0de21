//! Statistics command implementation.

use chrono::Local;

use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::error::TomoError;
use crate::features::stats::StatsSnapshot;
use crate::output::format_stats;
use crate::storage::SessionStore;

/// Show totals, streaks and averages.
///
/// # Errors
///
/// Returns an error if the log cannot be read.
pub fn stats(paths: &Paths, config: &Config, format: OutputFormat) -> Result<String, TomoError> {
    let log = SessionStore::at(paths.sessions.clone()).load_all()?;
    let snapshot = StatsSnapshot::compute(&log, Local::now(), config.stats.week);
    format_stats(&snapshot, format)
}
