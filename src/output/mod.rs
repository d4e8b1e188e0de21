//! Output formatting for tomo.
//!
//! This module provides formatters for displaying sessions and statistics
//! in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::TomoError;
use crate::features::focus::SessionRecord;
use crate::features::stats::StatsSnapshot;

pub use json::*;
pub use pretty::*;

/// Format a session list based on output format
///
/// # Errors
///
/// Returns `TomoError::Json` if JSON serialization fails.
pub fn format_sessions(
    records: &[SessionRecord],
    title: &str,
    format: OutputFormat,
) -> Result<String, TomoError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(records, title)),
        OutputFormat::Json => format_sessions_json(records, title),
    }
}

/// Format statistics based on output format
///
/// # Errors
///
/// Returns `TomoError::Json` if JSON serialization fails.
pub fn format_stats(stats: &StatsSnapshot, format: OutputFormat) -> Result<String, TomoError> {
    match format {
        OutputFormat::Pretty => Ok(format_stats_pretty(stats)),
        OutputFormat::Json => to_json(stats),
    }
}
