//! In-memory file store with failure injection.

use super::{FileError, FileResult, FileStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, String>,
    failing_reads: BTreeSet<String>,
    fail_writes: bool,
    reads: BTreeMap<String, usize>,
    writes: usize,
}

/// File store kept entirely in memory.
///
/// Used by tests and by embedders that persist files themselves.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    state: Mutex<MemoryState>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds files in bulk.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let store = Self::new();
        {
            let mut state = store.lock();
            for (path, content) in files {
                state.files.insert(path.into(), content.into());
            }
        }
        store
    }

    /// Makes every subsequent `read` of `path` fail with an I/O error.
    pub fn fail_reads_of(&self, path: impl Into<String>) {
        self.lock().failing_reads.insert(path.into());
    }

    /// Toggles failure of every `write` and `create`.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Current content of `path`, bypassing failure injection.
    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    /// Number of `read` calls made for `path`.
    pub fn read_count(&self, path: &str) -> usize {
        self.lock().reads.get(path).copied().unwrap_or(0)
    }

    /// Number of successful `write` and `create` calls.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl FileStore for MemoryFileStore {
    fn exists(&self, path: &str) -> bool {
        self.lock().files.contains_key(path)
    }

    fn read(&self, path: &str) -> FileResult<String> {
        let mut state = self.lock();
        *state.reads.entry(path.to_string()).or_insert(0) += 1;

        if state.failing_reads.contains(path) {
            return Err(injected(path));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_string()))
    }

    fn write(&self, path: &str, content: &str) -> FileResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(injected(path));
        }
        let Some(existing) = state.files.get_mut(path) else {
            return Err(FileError::NotFound(path.to_string()));
        };
        *existing = content.to_string();
        state.writes += 1;
        Ok(())
    }

    fn create(&self, path: &str, content: &str) -> FileResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(injected(path));
        }
        if state.files.contains_key(path) {
            return Err(FileError::AlreadyExists(path.to_string()));
        }
        state.files.insert(path.to_string(), content.to_string());
        state.writes += 1;
        Ok(())
    }
}

fn injected(path: &str) -> FileError {
    FileError::Io {
        path: path.to_string(),
        source: std::io::Error::other("injected failure"),
    }
}
