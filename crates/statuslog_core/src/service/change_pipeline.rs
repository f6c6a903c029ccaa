//! Change pipeline: detect -> encode -> append -> reconcile.
//!
//! # Responsibility
//! - Apply status auditing to single and batch record updates.
//! - Absorb every audit failure into an `AuditReport` plus a diagnostic log.
//!
//! # Invariants
//! - Nothing is read or written when state tracking is disabled.
//! - Detection runs against the snapshot passed in; nothing is re-fetched.
//! - Reconciliation runs at most once per call, and only after a change.
//! - No audit failure is returned to the caller.

use crate::audit::codec;
use crate::audit::detector::{self, StatusChange};
use crate::audit::reconcile;
use crate::audit::store::{resolve_path, LogStore};
use crate::clock::Clock;
use crate::config::Settings;
use crate::fs::FileStore;
use crate::model::entry::LogEntry;
use crate::model::record::TrackedRecord;
use log::{error, info};

/// Outcome of one audit pass. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Tracking was disabled; nothing was inspected.
    pub skipped: bool,
    /// Change entries appended.
    pub change_entries: usize,
    /// Backfill entries appended.
    pub backfilled: usize,
    /// Reconciliation passes attempted.
    pub reconciliations: usize,
    /// Appends that failed and were swallowed.
    pub failures: usize,
}

impl AuditReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Audit orchestrator over a file collaborator and a clock.
pub struct ChangePipeline<F: FileStore, C: Clock> {
    store: LogStore<F>,
    clock: C,
}

impl<F: FileStore, C: Clock> ChangePipeline<F, C> {
    pub fn new(files: F, clock: C) -> Self {
        Self {
            store: LogStore::new(files),
            clock,
        }
    }

    pub fn log_store(&self) -> &LogStore<F> {
        &self.store
    }

    /// Audits one incoming record against `snapshot`.
    pub fn on_single_update(
        &self,
        settings: &Settings,
        snapshot: &[TrackedRecord],
        incoming: &TrackedRecord,
    ) -> AuditReport {
        if !settings.tracking_enabled() {
            return AuditReport::skipped();
        }

        let mut report = AuditReport::default();
        let Some(change) = detector::detect_in(snapshot, incoming) else {
            return report;
        };

        let path = resolve_path(&settings.preferences.log_path);
        self.append_change(&path, &change, &mut report);
        self.run_reconciliation(&path, snapshot, &mut report);
        report
    }

    /// Audits a batch; reconciliation runs once if any record changed.
    pub fn on_batch_update(
        &self,
        settings: &Settings,
        snapshot: &[TrackedRecord],
        incoming: &[TrackedRecord],
    ) -> AuditReport {
        if !settings.tracking_enabled() {
            return AuditReport::skipped();
        }

        let mut report = AuditReport::default();
        let path = resolve_path(&settings.preferences.log_path);
        let mut any_changed = false;
        for record in incoming {
            if let Some(change) = detector::detect_in(snapshot, record) {
                any_changed = true;
                self.append_change(&path, &change, &mut report);
            }
        }

        if any_changed {
            self.run_reconciliation(&path, snapshot, &mut report);
        }
        report
    }

    /// Backfills every record in `records` that the log does not mention yet.
    pub fn reconcile(&self, settings: &Settings, records: &[TrackedRecord]) -> AuditReport {
        if !settings.tracking_enabled() {
            return AuditReport::skipped();
        }

        let mut report = AuditReport::default();
        let path = resolve_path(&settings.preferences.log_path);
        self.run_reconciliation(&path, records, &mut report);
        report
    }

    /// Decoded log entries; empty when tracking never wrote a log.
    pub fn entries(&self, settings: &Settings) -> Vec<LogEntry> {
        let path = resolve_path(&settings.preferences.log_path);
        codec::decode_all(&self.store.read_all(&path))
    }

    fn append_change(&self, path: &str, change: &StatusChange, report: &mut AuditReport) {
        let entry = LogEntry::change(
            change.record_name(),
            self.clock.today(),
            self.clock.now_time(),
            change.old_status.clone(),
            change.new_status.clone(),
        );

        match self.store.append_or_create(path, &codec::encode(&entry)) {
            Ok(()) => {
                report.change_entries += 1;
                info!(
                    "event=status_change module=audit status=ok record={} path={}",
                    entry.record_name, path
                );
            }
            Err(err) => {
                report.failures += 1;
                error!(
                    "event=status_change module=audit status=error error_code=log_append_failed record={} path={} error={}",
                    entry.record_name, path, err
                );
            }
        }
    }

    fn run_reconciliation(&self, path: &str, records: &[TrackedRecord], report: &mut AuditReport) {
        report.reconciliations += 1;
        match reconcile::reconcile(&self.store, path, records, &self.clock.today()) {
            Ok(0) => {}
            Ok(count) => {
                report.backfilled += count;
                info!(
                    "event=reconcile module=audit status=ok backfilled={} path={}",
                    count, path
                );
            }
            Err(err) => {
                report.failures += 1;
                error!(
                    "event=reconcile module=audit status=error error_code=backfill_append_failed path={} error={}",
                    path, err
                );
            }
        }
    }
}
