//! Durable recording of finished sessions.
//!
//! A failed append is retried once. If it still fails, the record is written
//! to a pending file next to the log and the caller gets
//! `TomoError::Unsaved`. Pending records are merged into the log the next
//! time [`SessionRecorder::flush_pending`] runs.

use tracing::{info, warn};

use super::SessionStore;
use crate::config::Paths;
use crate::error::TomoError;
use crate::features::focus::SessionRecord;

/// Writes finished sessions to the log, spilling to a pending file on failure.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    store: SessionStore,
    pending: SessionStore,
}

impl SessionRecorder {
    /// Recorder over an explicit log and pending file.
    #[must_use]
    pub const fn new(store: SessionStore, pending: SessionStore) -> Self {
        Self { store, pending }
    }

    /// Recorder over the files under a data directory.
    #[must_use]
    pub fn from_paths(paths: &Paths) -> Self {
        Self::new(
            SessionStore::at(paths.sessions.clone()),
            SessionStore::at(paths.pending.clone()),
        )
    }

    /// The session log.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Append a finished session.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Unsaved` when the append failed twice. The error
    /// carries the record and, if spilling worked, the pending file path.
    pub fn record(&self, record: &SessionRecord) -> Result<(), TomoError> {
        let Err(source) = self.append_with_retry(record) else {
            return Ok(());
        };

        let spilled_to = match self.pending.append(record.clone()) {
            Ok(()) => Some(self.pending.path().to_path_buf()),
            Err(e) => {
                warn!(error = %e, "could not write pending session");
                None
            }
        };

        Err(TomoError::Unsaved {
            record: Box::new(record.clone()),
            spilled_to,
            source: Box::new(source),
        })
    }

    fn append_with_retry(&self, record: &SessionRecord) -> Result<(), TomoError> {
        match self.store.append(record.clone()) {
            Err(e) if e.is_transient() => {
                warn!(error = %e, "append failed, retrying once");
                self.store.append(record.clone())
            }
            other => other,
        }
    }

    /// Merge records left in the pending file by an earlier failed append.
    ///
    /// Returns how many records were added to the log. The pending file is
    /// removed once its records are in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or the log cannot be
    /// written. The pending file is kept in that case.
    pub fn flush_pending(&self) -> Result<usize, TomoError> {
        let pending = self.pending.load_all()?;
        if pending.is_empty() {
            return Ok(0);
        }

        let added = self.store.merge(pending)?;
        self.pending.clear()?;
        if added > 0 {
            info!(added, "merged pending sessions into the log");
        }
        Ok(added)
    }
}
