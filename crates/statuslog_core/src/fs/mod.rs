//! File collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the narrow file API the audit log consumes (`exists`, `read`,
//!   `write`, `create`).
//! - Provide a directory-backed store and an in-memory store.
//!
//! # Invariants
//! - Paths are vault-relative and `/`-separated.
//! - `write` only targets existing files; `create` only targets new files.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod local;
mod memory;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;

pub type FileResult<T> = Result<T, FileError>;

/// File collaborator error.
#[derive(Debug)]
pub enum FileError {
    NotFound(String),
    AlreadyExists(String),
    /// Path escapes the store root or is absolute.
    InvalidPath(String),
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl Display for FileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not found: {path}"),
            Self::AlreadyExists(path) => write!(f, "file already exists: {path}"),
            Self::InvalidPath(path) => write!(f, "invalid vault path: `{path}`"),
            Self::Io { path, source } => write!(f, "i/o error on `{path}`: {source}"),
        }
    }
}

impl Error for FileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// File API consumed by the log accessor and the reconciler.
pub trait FileStore {
    /// Returns whether a file exists at `path`.
    fn exists(&self, path: &str) -> bool;
    /// Reads the full content; fails when missing or unreadable.
    fn read(&self, path: &str) -> FileResult<String>;
    /// Replaces the content of an existing file.
    fn write(&self, path: &str, content: &str) -> FileResult<()>;
    /// Creates a new file with `content`.
    fn create(&self, path: &str, content: &str) -> FileResult<()>;
}

impl<T: FileStore + ?Sized> FileStore for &T {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn read(&self, path: &str) -> FileResult<String> {
        (**self).read(path)
    }

    fn write(&self, path: &str, content: &str) -> FileResult<()> {
        (**self).write(path, content)
    }

    fn create(&self, path: &str, content: &str) -> FileResult<()> {
        (**self).create(path, content)
    }
}
