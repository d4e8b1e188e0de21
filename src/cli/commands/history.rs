//! History command implementation.

use chrono::Local;

use super::build_filter;
use crate::cli::args::{HistoryArgs, OutputFormat};
use crate::config::Paths;
use crate::error::TomoError;
use crate::output::format_sessions;
use crate::storage::SessionStore;

/// Show the most recent sessions, newest first.
///
/// # Errors
///
/// Returns an error if the filter is invalid or the log cannot be read.
pub fn history(paths: &Paths, args: &HistoryArgs, format: OutputFormat) -> Result<String, TomoError> {
    let filter = build_filter(&args.filter, Local::now().date_naive())?;
    let store = SessionStore::at(paths.sessions.clone());
    let records = store.history(args.limit, &filter)?;

    let title = match args.filter.kind {
        Some(kind) => format!("{} history", kind.display_name()),
        None => "History".to_string(),
    };
    format_sessions(&records, &title, format)
}
