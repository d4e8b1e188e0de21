//! Export of the session log.
//!
//! `export` is a pure projection: the same log, filter and format always
//! produce the same bytes. Writing the bytes somewhere is a separate step.

pub mod csv;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::SessionFilter;
use crate::error::TomoError;
use crate::features::focus::SessionRecord;

/// Export file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array of records
    #[default]
    Json,
    /// Comma-separated values with a header row
    Csv,
}

impl ExportFormat {
    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Serialize the records matching `filter`, in log order.
///
/// # Errors
///
/// Returns `TomoError::Validation` for an inverted date range and
/// `TomoError::Json` if serialization fails.
pub fn export(
    log: &[SessionRecord],
    filter: &SessionFilter,
    format: ExportFormat,
) -> Result<Vec<u8>, TomoError> {
    filter.validate()?;
    let records = filter.apply(log);

    let bytes = match format {
        ExportFormat::Json => {
            let mut json = serde_json::to_vec_pretty(&records)?;
            json.push(b'\n');
            json
        }
        ExportFormat::Csv => csv::to_csv(&records).into_bytes(),
    };

    tracing::debug!(records = records.len(), %format, "exported sessions");
    Ok(bytes)
}

/// Default file name for an export made at `now`.
#[must_use]
pub fn default_export_path(dir: &Path, format: ExportFormat, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "tomo-sessions-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    ))
}

/// Write export bytes to `destination`, creating parent directories.
///
/// # Errors
///
/// Returns `TomoError::Io` if the directory or file cannot be written.
pub fn write_export(bytes: &[u8], destination: &Path) -> Result<PathBuf, TomoError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| TomoError::io(parent, e))?;
    }
    fs::write(destination, bytes).map_err(|e| TomoError::io(destination, e))?;
    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::focus::{Completion, SessionKind};
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn record(kind: SessionKind, day: u32, note: Option<&str>) -> SessionRecord {
        let started = Local.with_ymd_and_hms(2026, 3, day, 9, 30, 0).unwrap();
        SessionRecord {
            kind,
            started_at: started,
            ended_at: started + Duration::minutes(25),
            planned_duration_seconds: 1500,
            actual_duration_seconds: 1500,
            completion: Completion::Completed,
            note: note.map(str::to_string),
        }
    }

    fn sample_log() -> Vec<SessionRecord> {
        let mut cancelled = record(SessionKind::Focus, 3, Some("interrupted"));
        cancelled.completion = Completion::Cancelled;
        cancelled.actual_duration_seconds = 420;
        cancelled.ended_at = cancelled.started_at + Duration::seconds(420);

        vec![
            record(SessionKind::Focus, 1, Some("essay, part \"one\"")),
            record(SessionKind::Break, 1, None),
            record(SessionKind::Focus, 2, Some("line one\nline two")),
            cancelled,
        ]
    }

    #[test]
    fn test_json_round_trip() {
        let log = sample_log();
        let bytes = export(&log, &SessionFilter::all(), ExportFormat::Json).unwrap();

        let parsed: Vec<SessionRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, log);
    }

    #[test]
    fn test_json_respects_filter() {
        let log = sample_log();
        let filter = SessionFilter::all().with_kind(SessionKind::Break);
        let bytes = export(&log, &filter, ExportFormat::Json).unwrap();

        let parsed: Vec<SessionRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, vec![log[1].clone()]);
    }

    #[test]
    fn test_csv_rows() {
        let log = sample_log();
        let bytes = export(&log, &SessionFilter::all(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with(
            "kind,started_at,ended_at,planned_duration,actual_duration,completion,note\n"
        ));

        let first = log[0].started_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, false);
        assert!(text.contains(&format!("focus,{first},")));
        assert!(text.contains(",1500,1500,completed,\"essay, part \"\"one\"\"\"\n"));
        assert!(text.contains(",completed,\n"));
        assert!(text.contains("\"line one\nline two\""));
        assert!(text.contains(",1500,420,cancelled,interrupted\n"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let log = sample_log();
        let a = export(&log, &SessionFilter::all(), ExportFormat::Csv).unwrap();
        let b = export(&log, &SessionFilter::all(), ExportFormat::Csv).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let from = chrono::NaiveDate::from_ymd_opt(2026, 3, 5);
        let to = chrono::NaiveDate::from_ymd_opt(2026, 3, 1);
        let filter = SessionFilter::all().between(from, to);

        assert!(matches!(
            export(&sample_log(), &filter, ExportFormat::Json),
            Err(TomoError::Validation(_))
        ));
    }

    #[test]
    fn test_default_export_path() {
        let now = Local.with_ymd_and_hms(2026, 3, 11, 8, 5, 9).unwrap();
        let path = default_export_path(Path::new("/data/exports"), ExportFormat::Csv, now);
        assert_eq!(
            path,
            PathBuf::from("/data/exports/tomo-sessions-20260311-080509.csv")
        );
    }

    #[test]
    fn test_write_export_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a").join("b").join("out.json");

        let written = write_export(b"[]\n", &dest).unwrap();
        assert_eq!(written, dest);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "[]\n");
    }
}
