//! Audit log entry model.
//!
//! # Invariants
//! - An entry is created exactly once, when a status transition or a
//!   reconciliation gap is detected, and is never edited afterwards.
//! - Backfill entries carry no time and no previous status.

/// How an entry came to exist in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    /// Written when a record's status field changed.
    Change,
    /// Synthesized during reconciliation for a record never logged before.
    Backfill,
}

/// One line of the project log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub record_name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:mm:ss`; absent for backfill entries.
    pub time: Option<String>,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
    pub origin: EntryOrigin,
}

impl LogEntry {
    /// Builds an entry for a detected status transition.
    pub fn change(
        record_name: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        old_status: Option<String>,
        new_status: Option<String>,
    ) -> Self {
        Self {
            record_name: record_name.into(),
            date: date.into(),
            time: Some(time.into()),
            old_status,
            new_status,
            origin: EntryOrigin::Change,
        }
    }

    /// Builds a reconciliation backfill entry.
    pub fn backfill(
        record_name: impl Into<String>,
        date: impl Into<String>,
        initial_status: impl Into<String>,
    ) -> Self {
        Self {
            record_name: record_name.into(),
            date: date.into(),
            time: None,
            old_status: None,
            new_status: Some(initial_status.into()),
            origin: EntryOrigin::Backfill,
        }
    }
}
