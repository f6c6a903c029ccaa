use statuslog_core::db::open_db_in_memory;
use statuslog_core::{
    ChangePipeline, FileStore, FixedClock, LocalFileStore, MemoryFileStore, RecordCache,
    RecordStore, RepoError, Settings, SqliteRecordStore, TrackedRecord, TrackedService,
    STATUS_FIELD,
};
use std::collections::BTreeMap;

const DATE: &str = "2026-10-14";
const TIME: &str = "17:05:09";

fn status(value: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(STATUS_FIELD.to_string(), value.to_string())])
}

#[test]
fn update_persists_record_and_logs_transition() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    repo.create_note("notes/a.md", &status("todo")).unwrap();
    repo.create_note("notes/b.md", &status("todo")).unwrap();
    let files = MemoryFileStore::new();
    let service = TrackedService::new(repo, ChangePipeline::new(&files, FixedClock::new(DATE, TIME)));

    let snapshot = service.repo().list_records().unwrap();
    let report = service
        .update_record(
            &Settings::tracking(""),
            &snapshot,
            &TrackedRecord::with_status("notes/a.md", "doing"),
        )
        .unwrap();

    assert_eq!(report.change_entries, 1);
    assert_eq!(
        service.repo().get_record("notes/a.md").unwrap().unwrap().status(),
        Some("doing")
    );
    assert_eq!(
        files.content("project-log.md").as_deref(),
        Some("[[a]],2026-10-14,17:05:09,todo,doing\n[[b]],2026-10-14,,,backlog\n")
    );
}

#[test]
fn primary_update_proceeds_when_logging_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    repo.create_note("a.md", &status("todo")).unwrap();
    let files = MemoryFileStore::new();
    files.fail_writes(true);
    let service = TrackedService::new(repo, ChangePipeline::new(&files, FixedClock::new(DATE, TIME)));

    let snapshot = service.repo().list_records().unwrap();
    let report = service
        .update_record(
            &Settings::tracking(""),
            &snapshot,
            &TrackedRecord::with_status("a.md", "done"),
        )
        .unwrap();

    assert!(!report.is_clean());
    assert_eq!(
        service.repo().get_record("a.md").unwrap().unwrap().status(),
        Some("done")
    );
}

#[test]
fn store_errors_are_returned_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::new();
    let service = TrackedService::new(
        SqliteRecordStore::new(&conn),
        ChangePipeline::new(&files, FixedClock::new(DATE, TIME)),
    );

    let err = service
        .update_record(
            &Settings::tracking(""),
            &[],
            &TrackedRecord::with_status("ghost.md", "done"),
        )
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(id) if id == "ghost.md"));
    assert!(files.content("project-log.md").is_none());
}

#[test]
fn batch_update_persists_all_and_logs_changed_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    for id in ["a.md", "b.md", "c.md"] {
        repo.create_note(id, &status("todo")).unwrap();
    }
    let files = MemoryFileStore::new();
    let service = TrackedService::new(repo, ChangePipeline::new(&files, FixedClock::new(DATE, TIME)));
    let mut cache = RecordCache::new(service.repo().list_records().unwrap());

    let incoming = vec![
        TrackedRecord::with_status("a.md", "todo").with_value("owner", "kim"),
        TrackedRecord::with_status("b.md", "done"),
        TrackedRecord::with_status("c.md", "todo"),
    ];
    let report = service
        .update_records(&Settings::tracking("log"), cache.records(), &incoming)
        .unwrap();
    cache.update_records(incoming);

    assert_eq!(report.change_entries, 1);
    assert_eq!(report.reconciliations, 1);
    assert_eq!(service.repo().list_records().unwrap(), cache.records());
    let log = files.content("log/project-log.md").unwrap();
    assert_eq!(log.lines().next(), Some("[[b]],2026-10-14,17:05:09,todo,done"));
    assert_eq!(log.lines().count(), 3);
}

#[test]
fn reconcile_uses_the_full_store_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    repo.create_note("a.md", &status("todo")).unwrap();
    repo.create_note("b.md", &BTreeMap::new()).unwrap();
    let files = MemoryFileStore::with_files([("a.md", "---\nstatus: todo\n---\n")]);
    let service = TrackedService::new(repo, ChangePipeline::new(&files, FixedClock::new(DATE, TIME)));
    let settings = Settings::tracking("");

    let first = service.reconcile(&settings).unwrap();
    let second = service.reconcile(&settings).unwrap();

    assert_eq!(first.backfilled, 2);
    assert_eq!(second.backfilled, 0);
    assert_eq!(
        files.content("project-log.md").as_deref(),
        Some("[[a]],2026-10-14,,,todo\n[[b]],2026-10-14,,,backlog\n")
    );
}

#[test]
fn disabled_tracking_still_applies_mutations() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    repo.create_note("a.md", &status("todo")).unwrap();
    let files = MemoryFileStore::new();
    let service = TrackedService::new(repo, ChangePipeline::new(&files, FixedClock::new(DATE, TIME)));

    let snapshot = service.repo().list_records().unwrap();
    let report = service
        .update_record(
            &Settings::default(),
            &snapshot,
            &TrackedRecord::with_status("a.md", "done"),
        )
        .unwrap();

    assert!(report.skipped);
    assert_eq!(files.write_count(), 0);
    assert_eq!(
        service.repo().get_record("a.md").unwrap().unwrap().status(),
        Some("done")
    );
}

#[test]
fn field_mutations_pass_through_to_the_store() {
    let conn = open_db_in_memory().unwrap();
    let files = MemoryFileStore::new();
    let service = TrackedService::new(
        SqliteRecordStore::new(&conn),
        ChangePipeline::new(&files, FixedClock::new(DATE, TIME)),
    );

    service.create_note("a.md", &BTreeMap::new()).unwrap();
    service.add_field("priority", "low").unwrap();
    service.rename_field("priority", "urgency").unwrap();
    let record = service.repo().get_record("a.md").unwrap().unwrap();
    assert_eq!(record.values["urgency"], "low");

    service.delete_field("urgency").unwrap();
    service.delete_record("a.md").unwrap();
    assert!(service.repo().list_records().unwrap().is_empty());
    assert_eq!(files.write_count(), 0);
}

#[test]
fn local_vault_end_to_end() {
    let vault = tempfile::tempdir().unwrap();
    let files = LocalFileStore::new(vault.path());
    files
        .create("projects/alpha.md", "---\nstatus: todo\n---\n# Alpha\n")
        .unwrap();
    files
        .create("projects/beta.md", "---\nstatus: blocked\n---\n# Beta\n")
        .unwrap();

    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecordStore::new(&conn);
    repo.create_note("projects/alpha.md", &status("todo")).unwrap();
    repo.create_note("projects/beta.md", &status("blocked")).unwrap();
    let service = TrackedService::new(
        repo,
        ChangePipeline::new(files.clone(), FixedClock::new(DATE, TIME)),
    );

    let snapshot = service.repo().list_records().unwrap();
    service
        .update_record(
            &Settings::tracking("meta"),
            &snapshot,
            &TrackedRecord::with_status("projects/alpha.md", "done"),
        )
        .unwrap();

    let log = std::fs::read_to_string(vault.path().join("meta/project-log.md")).unwrap();
    assert_eq!(
        log,
        "[[alpha]],2026-10-14,17:05:09,todo,done\n[[beta]],2026-10-14,,,blocked\n"
    );
}
