//! Project log file accessor.
//!
//! # Responsibility
//! - Resolve the log file path from settings.
//! - Read prior content tolerantly and append new lines.
//!
//! # Invariants
//! - Appends serialize through one lock per accessor, so two appends through
//!   the same accessor never lose each other's lines.
//! - Existing content is never rewritten with less than it held: an append
//!   whose prior read fails is abandoned.

use crate::fs::{FileError, FileStore};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// File name of the project log inside the configured folder.
pub const LOG_FILE_NAME: &str = "project-log.md";

/// Failure while appending to the project log.
#[derive(Debug)]
pub enum LogStoreError {
    /// Log exists but its current content could not be read.
    Read(FileError),
    /// Writing the concatenated content failed.
    Write(FileError),
    /// Creating the log on first append failed.
    Create(FileError),
    /// A previous append panicked while holding the lock.
    LockPoisoned,
}

impl Display for LogStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read project log: {err}"),
            Self::Write(err) => write!(f, "failed to write project log: {err}"),
            Self::Create(err) => write!(f, "failed to create project log: {err}"),
            Self::LockPoisoned => write!(f, "project log lock poisoned"),
        }
    }
}

impl Error for LogStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(err) | Self::Write(err) | Self::Create(err) => Some(err),
            Self::LockPoisoned => None,
        }
    }
}

/// Resolves the project log path for a configured folder.
///
/// An empty folder places the log at the vault root.
pub fn resolve_path(log_path: &str) -> String {
    if log_path.is_empty() {
        LOG_FILE_NAME.to_string()
    } else {
        format!("{log_path}/{LOG_FILE_NAME}")
    }
}

/// Read/append accessor over the file collaborator.
pub struct LogStore<F: FileStore> {
    files: F,
    append_lock: Mutex<()>,
}

impl<F: FileStore> LogStore<F> {
    pub fn new(files: F) -> Self {
        Self {
            files,
            append_lock: Mutex::new(()),
        }
    }

    /// Underlying file collaborator.
    pub fn files(&self) -> &F {
        &self.files
    }

    /// Returns the log content, or an empty string when the log is missing
    /// or unreadable.
    pub fn read_all(&self, path: &str) -> String {
        if !self.files.exists(path) {
            return String::new();
        }
        match self.files.read(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    "event=log_read module=audit status=error error_code=log_read_failed path={} error={}",
                    path, err
                );
                String::new()
            }
        }
    }

    /// Appends `new_text` to the log, creating the file on first use.
    pub fn append_or_create(&self, path: &str, new_text: &str) -> Result<(), LogStoreError> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| LogStoreError::LockPoisoned)?;

        if !self.files.exists(path) {
            return self
                .files
                .create(path, new_text)
                .map_err(LogStoreError::Create);
        }

        let mut content = self.files.read(path).map_err(LogStoreError::Read)?;
        content.push_str(new_text);
        self.files
            .write(path, &content)
            .map_err(LogStoreError::Write)
    }
}
