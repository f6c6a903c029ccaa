//! In-memory mirror of the visible record set.
//!
//! # Responsibility
//! - Hold the ordered records used as the "existing" snapshot for detection
//!   and reconciliation.
//! - Track record and field mutations after the store applies them.
//!
//! # Invariants
//! - At most one record per id; insertion order is preserved.

use crate::model::record::TrackedRecord;

/// Ordered record cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCache {
    records: Vec<TrackedRecord>,
}

impl RecordCache {
    pub fn new(records: Vec<TrackedRecord>) -> Self {
        let mut cache = Self::default();
        for record in records {
            cache.add_record(record);
        }
        cache
    }

    /// Snapshot view for one pipeline call.
    pub fn records(&self) -> &[TrackedRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&TrackedRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Adds a record, replacing one with the same id in place.
    pub fn add_record(&mut self, record: TrackedRecord) {
        match self.position(&record.id) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
    }

    /// Replaces a known record; returns `false` for unknown ids.
    pub fn update_record(&mut self, record: TrackedRecord) -> bool {
        match self.position(&record.id) {
            Some(index) => {
                self.records[index] = record;
                true
            }
            None => false,
        }
    }

    /// Replaces every known record in `records`; returns how many matched.
    pub fn update_records(&mut self, records: impl IntoIterator<Item = TrackedRecord>) -> usize {
        records
            .into_iter()
            .map(|record| usize::from(self.update_record(record)))
            .sum()
    }

    pub fn delete_record(&mut self, id: &str) -> Option<TrackedRecord> {
        self.position(id).map(|index| self.records.remove(index))
    }

    /// Adds `name` with `default_value` to records that lack it.
    pub fn add_field(&mut self, name: &str, default_value: &str) {
        for record in &mut self.records {
            record
                .values
                .entry(name.to_string())
                .or_insert_with(|| default_value.to_string());
        }
    }

    /// Renames a field on every record; an existing target value is replaced.
    pub fn update_field(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        for record in &mut self.records {
            if let Some(value) = record.values.remove(from) {
                record.values.insert(to.to_string(), value);
            }
        }
    }

    pub fn delete_field(&mut self, name: &str) {
        for record in &mut self.records {
            record.values.remove(name);
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}
