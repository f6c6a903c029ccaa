//! Directory-backed file store.

use super::{FileError, FileResult, FileStore};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

/// Maps vault-relative paths onto a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> FileResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if path.trim().is_empty() || escapes {
            return Err(FileError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalFileStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full| full.is_file())
    }

    fn read(&self, path: &str) -> FileResult<String> {
        let full = self.resolve(path)?;
        std::fs::read_to_string(&full).map_err(|err| io_error(path, err))
    }

    fn write(&self, path: &str, content: &str) -> FileResult<()> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(FileError::NotFound(path.to_string()));
        }
        std::fs::write(&full, content).map_err(|err| io_error(path, err))
    }

    fn create(&self, path: &str, content: &str) -> FileResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|err| io_error(path, err))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|err| io_error(path, err))?;
        file.write_all(content.as_bytes())
            .map_err(|err| io_error(path, err))
    }
}

fn io_error(path: &str, err: std::io::Error) -> FileError {
    match err.kind() {
        ErrorKind::NotFound => FileError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => FileError::AlreadyExists(path.to_string()),
        _ => FileError::Io {
            path: path.to_string(),
            source: err,
        },
    }
}
