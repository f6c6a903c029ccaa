//! Command-line front end for the status audit log.
//!
//! # Responsibility
//! - Operate on a vault directory: record index, settings, project log.
//! - Surface record-store errors; audit failures only show up in the report.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use statuslog_core::db::open_db;
use statuslog_core::{
    default_log_level, init_logging, AuditReport, ChangePipeline, EntryOrigin, FileStore,
    LocalFileStore, RecordStore, Settings, SqliteRecordStore, SystemClock, TrackedService,
    STATUS_FIELD,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const STATE_DIR: &str = ".statuslog";
const DB_FILE_NAME: &str = "records.sqlite3";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Status-change audit log for a markdown vault
#[derive(Parser, Debug)]
#[command(name = "statuslog", version, long_about = None)]
struct Cli {
    /// Vault root directory
    #[arg(long, default_value = ".")]
    vault: PathBuf,

    /// Diagnostic log level
    #[arg(long)]
    log_level: Option<String>,

    /// Directory for diagnostic logs (defaults to `<vault>/.statuslog/logs`)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update tracking preferences
    Configure {
        /// Enable or disable state tracking
        #[arg(long)]
        tracking: Option<bool>,
        /// Folder holding project-log.md, relative to the vault
        #[arg(long)]
        log_path: Option<String>,
    },
    #[command(flatten)]
    Vault(VaultCommand),
}

/// Commands that operate on the record index and the project log.
#[derive(Subcommand, Debug)]
enum VaultCommand {
    /// Register a record, creating its note if needed
    Track {
        /// Vault-relative note path, e.g. `projects/alpha.md`
        id: String,
        #[arg(long)]
        status: Option<String>,
    },
    /// Change the status of a tracked record
    SetStatus { id: String, status: String },
    /// Backfill log entries for records never logged
    Reconcile,
    /// Print decoded log entries
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let vault = absolute(&cli.vault)?;
    let state_dir = vault.join(STATE_DIR);
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("failed to create `{}`", state_dir.display()))?;

    let log_dir = cli.log_dir.clone().unwrap_or_else(|| state_dir.join("logs"));
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &absolute(&log_dir)?.to_string_lossy()) {
        eprintln!("warning: diagnostic logging disabled: {err}");
    }

    let settings_path = state_dir.join(SETTINGS_FILE_NAME);
    let settings = Settings::load(&settings_path)?;

    match cli.command {
        Command::Configure { tracking, log_path } => {
            configure(settings, &settings_path, tracking, log_path)
        }
        Command::Vault(command) => run(command, &vault, &state_dir, &settings),
    }
}

fn configure(
    mut settings: Settings,
    settings_path: &Path,
    tracking: Option<bool>,
    log_path: Option<String>,
) -> Result<()> {
    if let Some(enabled) = tracking {
        settings.preferences.enable_state_tracking = enabled;
    }
    if let Some(log_path) = log_path {
        settings.preferences.log_path = log_path.trim_matches('/').to_string();
    }
    settings.save(settings_path)?;
    info!(
        "event=cli_configure module=cli status=ok tracking={} log_path={}",
        settings.preferences.enable_state_tracking, settings.preferences.log_path
    );
    println!(
        "tracking={} log_path={:?}",
        settings.preferences.enable_state_tracking, settings.preferences.log_path
    );
    Ok(())
}

fn run(command: VaultCommand, vault: &Path, state_dir: &Path, settings: &Settings) -> Result<()> {
    info!("event=cli_command module=cli status=start command={command:?}");
    let conn = open_db(state_dir.join(DB_FILE_NAME))?;
    let files = LocalFileStore::new(vault);
    let service = TrackedService::new(
        SqliteRecordStore::new(&conn),
        ChangePipeline::new(files.clone(), SystemClock),
    );

    match command {
        VaultCommand::Track { id, status } => {
            let mut values = BTreeMap::new();
            if let Some(status) = &status {
                values.insert(STATUS_FIELD.to_string(), status.clone());
            }
            if !files.exists(&id) {
                files.create(&id, &initial_note(status.as_deref()))?;
            }
            let record = service.create_note(&id, &values)?;
            println!("tracking {}", record.id);
        }
        VaultCommand::SetStatus { id, status } => {
            let snapshot = service.repo().list_records()?;
            let mut record = snapshot
                .iter()
                .find(|record| record.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("record not tracked: {id}"))?;
            record.values.insert(STATUS_FIELD.to_string(), status);
            let report = service.update_record(settings, &snapshot, &record)?;
            print_report(&report);
        }
        VaultCommand::Reconcile => {
            let report = service.reconcile(settings)?;
            print_report(&report);
        }
        VaultCommand::Show => {
            for entry in service.pipeline().entries(settings) {
                let origin = match entry.origin {
                    EntryOrigin::Change => "change",
                    EntryOrigin::Backfill => "backfill",
                };
                println!(
                    "{} {:<8} {:<8} {} -> {} [{}]",
                    entry.date,
                    entry.time.as_deref().unwrap_or("-"),
                    origin,
                    entry.old_status.as_deref().unwrap_or("-"),
                    entry.new_status.as_deref().unwrap_or("-"),
                    entry.record_name
                );
            }
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn initial_note(status: Option<&str>) -> String {
    match status {
        Some(status) => format!("---\n{STATUS_FIELD}: {status}\n---\n"),
        None => String::new(),
    }
}

fn print_report(report: &AuditReport) {
    if !report.is_clean() {
        warn!(
            "event=cli_audit module=cli status=error failures={}",
            report.failures
        );
    }
    if report.skipped {
        println!("state tracking disabled; log untouched");
        return;
    }
    println!(
        "logged={} backfilled={} failures={}",
        report.change_entries, report.backfilled, report.failures
    );
}
