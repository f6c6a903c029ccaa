//! Status-change audit log with self-healing reconciliation.
//!
//! Every status transition of a tracked record appends one line to
//! `project-log.md`; after each change the log is reconciled against the full
//! record set and records missing from it are backfilled. Audit failures are
//! logged and absorbed; they never block the record mutation itself.

pub mod audit;
pub mod cache;
pub mod clock;
pub mod config;
pub mod db;
pub mod fs;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use audit::codec::{decode_entry, decode_name, encode, LineParseError};
pub use audit::detector::{detect, StatusChange};
pub use audit::reconcile::{find_missing, DEFAULT_INITIAL_STATUS};
pub use audit::store::{resolve_path, LogStore, LogStoreError, LOG_FILE_NAME};
pub use cache::RecordCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Preferences, Settings, SettingsError};
pub use fs::{FileError, FileStore, LocalFileStore, MemoryFileStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{EntryOrigin, LogEntry};
pub use model::record::{record_name, RecordId, TrackedRecord, STATUS_FIELD};
pub use repo::record_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use service::change_pipeline::{AuditReport, ChangePipeline};
pub use service::tracked_service::TrackedService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
