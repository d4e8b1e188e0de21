//! Session filtering shared by history, queries and export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TomoError;
use crate::features::focus::{SessionKind, SessionRecord};

/// Predicates over session records. Every set field must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Only sessions of this kind
    pub kind: Option<SessionKind>,
    /// Only sessions started on or after this local date
    pub from: Option<NaiveDate>,
    /// Only sessions started on or before this local date
    pub to: Option<NaiveDate>,
}

impl SessionFilter {
    /// A filter that matches everything.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            kind: None,
            from: None,
            to: None,
        }
    }

    /// Restrict to one kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: SessionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to an inclusive date range.
    #[must_use]
    pub const fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Reject ranges that end before they start.
    ///
    /// # Errors
    ///
    /// Returns `TomoError::Validation` when `from` is after `to`.
    pub fn validate(&self) -> Result<(), TomoError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(TomoError::Validation(format!(
                    "date range starts after it ends ({from} > {to})"
                )));
            }
        }
        Ok(())
    }

    /// Whether no predicate is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kind.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// Check a single record.
    #[must_use]
    pub fn matches(&self, record: &SessionRecord) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }
        let date = record.local_date();
        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }

    /// Matching records, in their original order.
    #[must_use]
    pub fn apply(&self, records: &[SessionRecord]) -> Vec<SessionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
