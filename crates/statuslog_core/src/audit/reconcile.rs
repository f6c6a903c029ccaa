//! Log reconciliation against the full record set.
//!
//! # Responsibility
//! - Find records whose name never appears in the project log.
//! - Synthesize backfill entries with a best-effort initial status.
//!
//! # Invariants
//! - All backfill lines of one pass are written in a single append.
//! - A second pass with no intervening changes writes nothing.
//! - Metadata extraction never fails; it falls back to `backlog`.

use crate::audit::codec;
use crate::audit::store::{LogStore, LogStoreError};
use crate::fs::FileStore;
use crate::model::entry::LogEntry;
use crate::model::record::TrackedRecord;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

/// Initial status used when a record carries none.
pub const DEFAULT_INITIAL_STATUS: &str = "backlog";

static FRONT_MATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A---\r?\n((?s:.*?))\r?\n---").expect("valid front matter regex"));
static STATUS_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^status:[ \t]*(.*)$").expect("valid status key regex"));

/// Records absent from `log_content`, in `all_records` order.
pub fn find_missing<'a>(all_records: &'a [TrackedRecord], log_content: &str) -> Vec<&'a TrackedRecord> {
    let indexed = codec::indexed_names(log_content);
    all_records
        .iter()
        .filter(|record| !indexed.contains(record.name()))
        .collect()
}

/// Extracts `status:` from a leading `---` fenced metadata block.
///
/// Returns `None` when there is no block, no key, or an empty value.
pub fn front_matter_status(content: &str) -> Option<String> {
    let block = FRONT_MATTER_RE.captures(content)?.get(1)?.as_str();
    let value = STATUS_KEY_RE.captures(block)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Best-effort initial status for a record, read from its stored content.
pub fn initial_status<F: FileStore>(files: &F, record: &TrackedRecord) -> String {
    match files.read(&record.id) {
        Ok(content) => front_matter_status(&content).unwrap_or_else(|| {
            debug!(
                "event=backfill_status module=audit status=fallback reason=no_status_key record={}",
                record.name()
            );
            DEFAULT_INITIAL_STATUS.to_string()
        }),
        Err(err) => {
            warn!(
                "event=backfill_status module=audit status=fallback reason=content_unreadable record={} error={}",
                record.name(),
                err
            );
            DEFAULT_INITIAL_STATUS.to_string()
        }
    }
}

/// Builds backfill entries for every record missing from `log_content`.
pub fn backfill_entries<F: FileStore>(
    files: &F,
    all_records: &[TrackedRecord],
    log_content: &str,
    date: &str,
) -> Vec<LogEntry> {
    find_missing(all_records, log_content)
        .into_iter()
        .map(|record| LogEntry::backfill(record.name(), date, initial_status(files, record)))
        .collect()
}

/// Runs one reconciliation pass and returns the number of lines appended.
pub fn reconcile<F: FileStore>(
    store: &LogStore<F>,
    path: &str,
    all_records: &[TrackedRecord],
    date: &str,
) -> Result<usize, LogStoreError> {
    let content = store.read_all(path);
    let entries = backfill_entries(store.files(), all_records, &content, date);
    if entries.is_empty() {
        return Ok(0);
    }

    let text = entries.iter().map(codec::encode).collect::<String>();
    store.append_or_create(path, &text)?;
    Ok(entries.len())
}
