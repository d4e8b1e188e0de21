//! Export command implementation.

use chrono::Local;
use colored::Colorize;
use serde_json::json;

use super::build_filter;
use crate::cli::args::{ExportArgs, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::TomoError;
use crate::features::export::{default_export_path, export as export_log, write_export};
use crate::output::to_json;
use crate::storage::SessionStore;

/// Export the session log to a file.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log cannot be read, or
/// the destination cannot be written.
pub fn export(
    paths: &Paths,
    config: &Config,
    args: &ExportArgs,
    format: OutputFormat,
) -> Result<String, TomoError> {
    let now = Local::now();
    let filter = build_filter(&args.filter, now.date_naive())?;
    let export_format = args.format.unwrap_or(config.export.format);

    let log = SessionStore::at(paths.sessions.clone()).load_all()?;
    let bytes = export_log(&log, &filter, export_format)?;
    let count = filter.apply(&log).len();

    let destination = args.out.clone().unwrap_or_else(|| {
        default_export_path(&config.export_directory(paths), export_format, now)
    });
    let written = write_export(&bytes, &destination)?;

    match format {
        OutputFormat::Json => to_json(&json!({
            "path": written,
            "format": export_format,
            "count": count,
        })),
        OutputFormat::Pretty => Ok(format!(
            "{} Exported {} session{} as {} to {}",
            "✓".green(),
            count,
            if count == 1 { "" } else { "s" },
            export_format.extension().to_uppercase(),
            written.display()
        )),
    }
}
