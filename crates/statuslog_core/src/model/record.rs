//! Tracked record model.
//!
//! # Responsibility
//! - Mirror the externally owned record shape (`id` + named field values).
//! - Derive the log-facing record name from a path-like id.
//!
//! # Invariants
//! - `id` is unique within one record set.
//! - The audit log reads `id` and the `status` field only; it never mutates
//!   a record it did not create.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name whose changes are audited.
pub const STATUS_FIELD: &str = "status";

/// Path-like record identity, e.g. `projects/alpha.md`.
pub type RecordId = String;

/// Record exposed by the note store: identity plus named field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRecord {
    pub id: RecordId,
    pub values: BTreeMap<String, String>,
}

impl TrackedRecord {
    /// Creates a record with no field values.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    /// Creates a record with only the status field set.
    pub fn with_status(id: impl Into<RecordId>, status: impl Into<String>) -> Self {
        Self::new(id).with_value(STATUS_FIELD, status)
    }

    /// Builder-style field assignment.
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Current status value, `None` when the field is absent.
    pub fn status(&self) -> Option<&str> {
        self.values.get(STATUS_FIELD).map(String::as_str)
    }

    /// Name written between `[[` and `]]` in the project log.
    pub fn name(&self) -> &str {
        record_name(&self.id)
    }
}

/// Derives a record name: last `/` segment with a trailing `.md` stripped.
///
/// The same transform is used for log writes and reconciliation lookups, so
/// both sides always agree on identity.
pub fn record_name(id: &str) -> &str {
    let segment = id.rsplit('/').next().unwrap_or(id);
    segment.strip_suffix(".md").unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::{record_name, TrackedRecord};

    #[test]
    fn record_name_strips_folders_and_markdown_extension() {
        assert_eq!(record_name("notes/a.md"), "a");
        assert_eq!(record_name("deep/nested/path/Plan B.md"), "Plan B");
        assert_eq!(record_name("root.md"), "root");
    }

    #[test]
    fn record_name_keeps_other_extensions() {
        assert_eq!(record_name("files/report.pdf"), "report.pdf");
        assert_eq!(record_name("archive.md.bak"), "archive.md.bak");
    }

    #[test]
    fn status_is_none_when_field_missing() {
        let record = TrackedRecord::new("notes/a.md").with_value("priority", "high");
        assert_eq!(record.status(), None);
        assert_eq!(record.name(), "a");
    }
}
