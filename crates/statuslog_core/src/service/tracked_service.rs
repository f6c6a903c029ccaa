//! Record-store wrapper that audits status changes.
//!
//! # Responsibility
//! - Run the change pipeline before delegating each update to the store.
//! - Pass every other mutation through untouched.
//!
//! # Invariants
//! - The store is always called, whatever the audit outcome.
//! - Store errors are returned unchanged; audit errors never are.

use crate::clock::Clock;
use crate::config::Settings;
use crate::fs::FileStore;
use crate::model::record::TrackedRecord;
use crate::repo::record_repo::{RecordStore, RepoResult};
use crate::service::change_pipeline::{AuditReport, ChangePipeline};
use std::collections::BTreeMap;

/// Use-case service over a record store and the change pipeline.
pub struct TrackedService<R: RecordStore, F: FileStore, C: Clock> {
    repo: R,
    pipeline: ChangePipeline<F, C>,
}

impl<R: RecordStore, F: FileStore, C: Clock> TrackedService<R, F, C> {
    pub fn new(repo: R, pipeline: ChangePipeline<F, C>) -> Self {
        Self { repo, pipeline }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn pipeline(&self) -> &ChangePipeline<F, C> {
        &self.pipeline
    }

    /// Audits then persists one record update.
    ///
    /// `snapshot` is the record set as known before this update.
    pub fn update_record(
        &self,
        settings: &Settings,
        snapshot: &[TrackedRecord],
        record: &TrackedRecord,
    ) -> RepoResult<AuditReport> {
        let report = self.pipeline.on_single_update(settings, snapshot, record);
        self.repo.update_record(record)?;
        Ok(report)
    }

    /// Audits then persists a batch of record updates.
    pub fn update_records(
        &self,
        settings: &Settings,
        snapshot: &[TrackedRecord],
        records: &[TrackedRecord],
    ) -> RepoResult<AuditReport> {
        let report = self.pipeline.on_batch_update(settings, snapshot, records);
        self.repo.update_records(records)?;
        Ok(report)
    }

    /// Reconciles the log against every record currently in the store.
    pub fn reconcile(&self, settings: &Settings) -> RepoResult<AuditReport> {
        let records = self.repo.list_records()?;
        Ok(self.pipeline.reconcile(settings, &records))
    }

    pub fn create_note(
        &self,
        id: &str,
        values: &BTreeMap<String, String>,
    ) -> RepoResult<TrackedRecord> {
        self.repo.create_note(id, values)
    }

    pub fn delete_record(&self, id: &str) -> RepoResult<()> {
        self.repo.delete_record(id)
    }

    pub fn add_field(&self, name: &str, default_value: &str) -> RepoResult<()> {
        self.repo.add_field(name, default_value)
    }

    pub fn rename_field(&self, from: &str, to: &str) -> RepoResult<()> {
        self.repo.rename_field(from, to)
    }

    pub fn delete_field(&self, name: &str) -> RepoResult<()> {
        self.repo.delete_field(name)
    }
}
