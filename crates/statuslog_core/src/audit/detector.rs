//! Status change detection.
//!
//! # Invariants
//! - Detection is pure: it only compares two record views.
//! - A change fires only for a record already known in the snapshot.
//! - An absent status is distinct from every present status.

use crate::model::record::{record_name, RecordId, TrackedRecord};

/// Status transition for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub record_id: RecordId,
    pub old_status: Option<String>,
    pub new_status: Option<String>,
}

impl StatusChange {
    pub fn record_name(&self) -> &str {
        record_name(&self.record_id)
    }
}

/// Compares the known record against the incoming one.
pub fn detect(existing: Option<&TrackedRecord>, incoming: &TrackedRecord) -> Option<StatusChange> {
    let existing = existing?;
    if existing.status() == incoming.status() {
        return None;
    }

    Some(StatusChange {
        record_id: incoming.id.clone(),
        old_status: existing.status().map(str::to_string),
        new_status: incoming.status().map(str::to_string),
    })
}

/// Looks up a record by id in a snapshot.
pub fn find_existing<'a>(snapshot: &'a [TrackedRecord], id: &str) -> Option<&'a TrackedRecord> {
    snapshot.iter().find(|record| record.id == id)
}

/// Detects a change of `incoming` against its entry in `snapshot`.
pub fn detect_in(snapshot: &[TrackedRecord], incoming: &TrackedRecord) -> Option<StatusChange> {
    detect(find_existing(snapshot, &incoming.id), incoming)
}

#[cfg(test)]
mod tests {
    use super::{detect, detect_in};
    use crate::model::record::TrackedRecord;

    #[test]
    fn fires_on_status_transition() {
        let old = TrackedRecord::with_status("notes/a.md", "todo");
        let new = TrackedRecord::with_status("notes/a.md", "doing");

        let change = detect(Some(&old), &new).expect("status changed");
        assert_eq!(change.old_status.as_deref(), Some("todo"));
        assert_eq!(change.new_status.as_deref(), Some("doing"));
        assert_eq!(change.record_name(), "a");
    }

    #[test]
    fn ignores_unknown_records_and_unchanged_status() {
        let new = TrackedRecord::with_status("notes/a.md", "doing");
        assert!(detect(None, &new).is_none());

        let same = TrackedRecord::with_status("notes/a.md", "doing").with_value("owner", "kim");
        assert!(detect(Some(&same), &new).is_none());
    }

    #[test]
    fn absent_status_differs_from_present_status() {
        let without = TrackedRecord::new("notes/a.md");
        let with = TrackedRecord::with_status("notes/a.md", "todo");

        let added = detect(Some(&without), &with).expect("status added");
        assert_eq!(added.old_status, None);
        let removed = detect(Some(&with), &without).expect("status removed");
        assert_eq!(removed.new_status, None);
        assert!(detect(Some(&without), &without).is_none());
    }

    #[test]
    fn detect_in_matches_by_id() {
        let snapshot = vec![
            TrackedRecord::with_status("notes/a.md", "todo"),
            TrackedRecord::with_status("notes/b.md", "todo"),
        ];
        let incoming = TrackedRecord::with_status("notes/b.md", "done");

        let change = detect_in(&snapshot, &incoming).expect("b changed");
        assert_eq!(change.record_id, "notes/b.md");
        assert!(detect_in(&snapshot, &TrackedRecord::with_status("notes/c.md", "done")).is_none());
    }
}
