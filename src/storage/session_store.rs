//! Append-only session log stored as a JSON array.
//!
//! The log lives at `~/.tomo/sessions.json`. Every write rewrites the whole
//! file through a temporary file that is synced and then renamed over the
//! old one, so a crash mid-write leaves the previous log intact.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;
use serde_json::Value;

use crate::core::SessionFilter;
use crate::error::TomoError;
use crate::features::focus::{Completion, SessionKind, SessionRecord};

/// File-backed session log.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Use a log at a specific path. The file is created on first append.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record in insertion order.
    ///
    /// A missing or empty file is an empty log.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Io` if the file cannot be read and
    /// `TomoError::Corrupt` if any entry cannot be parsed.
    pub fn load_all(&self) -> Result<Vec<SessionRecord>, TomoError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(TomoError::io(&self.path, e)),
        };
        parse_log(&self.path, &contents)
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Corrupt` if the existing log cannot be parsed (the
    /// file is left untouched) and `TomoError::Io` if it cannot be written.
    pub fn append(&self, record: SessionRecord) -> Result<(), TomoError> {
        self.append_all(vec![record])
    }

    /// Append several records in one atomic swap.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::append`].
    pub fn append_all(&self, records: Vec<SessionRecord>) -> Result<(), TomoError> {
        for record in &records {
            record.validate().map_err(TomoError::Validation)?;
        }
        let mut log = self.load_all()?;
        log.extend(records);
        self.write_all(&log)
    }

    /// Append the records that are not already in the log.
    ///
    /// Returns how many were added.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::append`].
    pub fn merge(&self, records: Vec<SessionRecord>) -> Result<usize, TomoError> {
        let mut log = self.load_all()?;
        let before = log.len();
        for record in records {
            record.validate().map_err(TomoError::Validation)?;
            if !log.contains(&record) {
                log.push(record);
            }
        }
        let added = log.len() - before;
        if added > 0 {
            self.write_all(&log)?;
        }
        Ok(added)
    }

    /// Records matching `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` for an inverted date range, or any
    /// error from [`SessionStore::load_all`].
    pub fn query(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>, TomoError> {
        filter.validate()?;
        Ok(filter.apply(&self.load_all()?))
    }

    /// The `limit` most recently appended records matching `filter`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::query`].
    pub fn history(
        &self,
        limit: usize,
        filter: &SessionFilter,
    ) -> Result<Vec<SessionRecord>, TomoError> {
        filter.validate()?;
        Ok(recent(&self.load_all()?, limit, filter))
    }

    /// Remove the backing file.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Io` if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), TomoError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TomoError::io(&self.path, e)),
        }
    }

    /// Rewrite the file through a synced temp file and a rename.
    fn write_all(&self, records: &[SessionRecord]) -> Result<(), TomoError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| TomoError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");

        let result = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(json.as_bytes())?;
                f.flush()?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(TomoError::io(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), records = records.len(), "session log written");
        Ok(())
    }
}

/// The `limit` most recent records matching `filter`, newest first.
#[must_use]
pub fn recent(records: &[SessionRecord], limit: usize, filter: &SessionFilter) -> Vec<SessionRecord> {
    records
        .iter()
        .rev()
        .filter(|r| filter.matches(r))
        .take(limit)
        .cloned()
        .collect()
}

/// Entry written by the first version of the timer.
///
/// `timestamp` is a naive local time taken when the session was saved, and
/// `duration` is in minutes. A zero duration was written by `start -d 0`;
/// such entries hold no time and are dropped on load.
#[derive(Debug, Deserialize)]
struct LegacyEntry {
    timestamp: String,
    duration: u64,
    #[serde(default)]
    note: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl LegacyEntry {
    fn into_record(self) -> Result<Option<SessionRecord>, String> {
        if self.duration == 0 {
            return Ok(None);
        }
        let ended_at = parse_legacy_timestamp(&self.timestamp)?;
        let out_of_range = || format!("duration of {} minutes is out of range", self.duration);
        let seconds = self.duration.checked_mul(60).ok_or_else(out_of_range)?;
        let started_at = i64::try_from(seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| ended_at.checked_sub_signed(d))
            .ok_or_else(out_of_range)?;

        let kind = match self.kind.as_deref() {
            None => SessionKind::Focus,
            Some(s) => SessionKind::parse(s).ok_or_else(|| format!("unknown session type '{s}'"))?,
        };
        let note = match kind {
            SessionKind::Focus => self.note.filter(|n| !n.trim().is_empty()),
            SessionKind::Break => None,
        };

        Ok(Some(SessionRecord {
            kind,
            started_at,
            ended_at,
            planned_duration_seconds: seconds,
            actual_duration_seconds: seconds,
            completion: Completion::Completed,
            note,
        }))
    }
}

fn parse_legacy_timestamp(s: &str) -> Result<DateTime<Local>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| format!("invalid timestamp '{s}': {e}"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(crate::features::focus::session::truncate_to_seconds)
        .ok_or_else(|| format!("timestamp '{s}' does not exist in the local time zone"))
}

/// `Ok(None)` marks an entry that is skipped rather than loaded.
fn parse_entry(value: Value) -> Result<Option<SessionRecord>, String> {
    let is_legacy = value.get("timestamp").is_some() && value.get("started_at").is_none();
    let record = if is_legacy {
        match serde_json::from_value::<LegacyEntry>(value)
            .map_err(|e| e.to_string())?
            .into_record()?
        {
            Some(record) => record,
            None => return Ok(None),
        }
    } else {
        serde_json::from_value::<SessionRecord>(value).map_err(|e| e.to_string())?
    };
    record.validate()?;
    Ok(Some(record))
}

fn parse_log(path: &Path, contents: &str) -> Result<Vec<SessionRecord>, TomoError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<Value> = serde_json::from_str(contents).map_err(|e| TomoError::Corrupt {
        path: path.to_path_buf(),
        message: format!("expected a JSON array of sessions: {e}"),
    })?;

    let mut records = Vec::with_capacity(entries.len());
    for (i, value) in entries.into_iter().enumerate() {
        match parse_entry(value) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => tracing::warn!(
                path = %path.display(),
                entry = i,
                "skipping zero-length legacy session"
            ),
            Err(message) => {
                return Err(TomoError::Corrupt {
                    path: path.to_path_buf(),
                    message: format!("entry {i}: {message}"),
                })
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use tempfile::TempDir;

    fn record(kind: SessionKind, day: u32, hour: u32) -> SessionRecord {
        let started = Local.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap();
        SessionRecord {
            kind,
            started_at: started,
            ended_at: started + Duration::minutes(25),
            planned_duration_seconds: 1500,
            actual_duration_seconds: 1500,
            completion: Completion::Completed,
            note: Some(format!("day {day} hour {hour}")),
        }
    }

    fn create_test_store() -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::at(dir.path().join("data").join("sessions.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty_log() {
        let (_dir, store) = create_test_store();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load_preserves_order() {
        let (_dir, store) = create_test_store();
        let records = vec![
            record(SessionKind::Focus, 2, 10),
            record(SessionKind::Focus, 1, 9),
            record(SessionKind::Break, 2, 11),
        ];
        for r in &records {
            store.append(r.clone()).unwrap();
        }

        assert_eq!(store.load_all().unwrap(), records);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_history_newest_first_with_limit() {
        let (_dir, store) = create_test_store();
        let records: Vec<_> = (1..=5).map(|d| record(SessionKind::Focus, d, 9)).collect();
        store.append_all(records.clone()).unwrap();

        let history = store.history(2, &SessionFilter::all()).unwrap();
        assert_eq!(history, vec![records[4].clone(), records[3].clone()]);
    }

    #[test]
    fn test_query_filters_in_order() {
        let (_dir, store) = create_test_store();
        store
            .append_all(vec![
                record(SessionKind::Focus, 1, 9),
                record(SessionKind::Break, 2, 9),
                record(SessionKind::Focus, 3, 9),
                record(SessionKind::Focus, 4, 9),
            ])
            .unwrap();

        let filter = SessionFilter::all()
            .with_kind(SessionKind::Focus)
            .between(chrono::NaiveDate::from_ymd_opt(2026, 3, 2), None);
        let found = store.query(&filter).unwrap();
        let days: Vec<_> = found.iter().map(|r| r.started_at.date_naive().to_string()).collect();
        assert_eq!(days, vec!["2026-03-03", "2026-03-04"]);
    }

    #[test]
    fn test_corrupt_log_is_surfaced_and_untouched() {
        let (_dir, store) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, TomoError::Corrupt { .. }));

        let err = store.append(record(SessionKind::Focus, 1, 9)).unwrap_err();
        assert!(matches!(err, TomoError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_corrupt_entry_reports_index() {
        let (_dir, store) = create_test_store();
        store.append(record(SessionKind::Focus, 1, 9)).unwrap();
        let mut entries: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        entries.push(serde_json::json!({ "kind": "focus" }));
        fs::write(store.path(), serde_json::to_string(&entries).unwrap()).unwrap();

        match store.load_all() {
            Err(TomoError::Corrupt { message, path }) => {
                assert!(message.starts_with("entry 1:"), "{message}");
                assert_eq!(path, store.path());
            }
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_record_on_disk_is_corrupt() {
        let (_dir, store) = create_test_store();
        let mut bad = record(SessionKind::Focus, 1, 9);
        bad.ended_at = bad.started_at - Duration::minutes(1);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), serde_json::to_string(&vec![bad]).unwrap()).unwrap();

        assert!(matches!(store.load_all(), Err(TomoError::Corrupt { .. })));
    }

    #[test]
    fn test_unwritable_medium_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let store = SessionStore::at(blocker.join("sessions.json"));

        let err = store.append(record(SessionKind::Focus, 1, 9)).unwrap_err();
        assert!(matches!(err, TomoError::Io { .. }));
    }

    #[test]
    fn test_legacy_entries_are_converted() {
        let (_dir, store) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[
                {"timestamp": "2026-03-01T10:25:00.123456", "duration": 25, "note": "essay", "type": "focus"},
                {"timestamp": "2026-03-01T10:30:00", "duration": 5, "note": "Break session", "type": "break"},
                {"timestamp": "2026-03-01T11:00:00", "duration": 25}
            ]"#,
        )
        .unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.kind, SessionKind::Focus);
        assert_eq!(first.actual_duration_seconds, 1500);
        assert_eq!(first.completion, Completion::Completed);
        assert_eq!(first.note.as_deref(), Some("essay"));
        assert_eq!(first.started_at.hour(), 10);
        assert_eq!(first.started_at.minute(), 0);

        assert_eq!(records[1].kind, SessionKind::Break);
        assert!(records[1].note.is_none());
        assert_eq!(records[2].kind, SessionKind::Focus);

        // The next append rewrites legacy entries in the current shape.
        store.append(record(SessionKind::Focus, 2, 9)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("\"timestamp\""));
        assert_eq!(store.load_all().unwrap().len(), 4);
    }

    #[test]
    fn test_zero_length_legacy_entries_are_skipped() {
        let (_dir, store) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[
                {"timestamp": "2026-03-01T10:25:00", "duration": 25, "type": "focus"},
                {"timestamp": "2026-03-01T10:26:00", "duration": 0, "note": "oops", "type": "focus"}
            ]"#,
        )
        .unwrap();

        let records = store.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].actual_duration_seconds, 1500);

        store.append(record(SessionKind::Focus, 2, 9)).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("oops"));
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_oversized_legacy_duration_is_corrupt() {
        let (_dir, store) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[{"timestamp": "2026-03-01T10:25:00", "duration": 18446744073709551615}]"#,
        )
        .unwrap();

        let err = store.load_all().unwrap_err();
        assert!(err.to_string().contains("entry 0"));
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_merge_skips_existing() {
        let (_dir, store) = create_test_store();
        let a = record(SessionKind::Focus, 1, 9);
        let b = record(SessionKind::Focus, 2, 9);
        store.append(a.clone()).unwrap();

        assert_eq!(store.merge(vec![a.clone(), b.clone()]).unwrap(), 1);
        assert_eq!(store.load_all().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_append_rejects_invalid_record() {
        let (_dir, store) = create_test_store();
        let mut bad = record(SessionKind::Focus, 1, 9);
        bad.planned_duration_seconds = 0;

        assert!(matches!(store.append(bad), Err(TomoError::Validation(_))));
        assert!(!store.path().exists());
    }
}
