//! Settings snapshot consumed by the audit log.
//!
//! # Responsibility
//! - Deserialize host preferences (`enableStateTracking`, `logPath`).
//! - Provide defaults for missing files and missing keys.
//!
//! # Invariants
//! - Settings are read-only input; a snapshot is passed into each call.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Settings loading error.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read settings: {err}"),
            Self::Parse(err) => write!(f, "invalid settings json: {err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Audit-relevant preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Master switch; when off no log file is created or modified.
    pub enable_state_tracking: bool,
    /// Folder holding `project-log.md`; empty means the vault root.
    pub log_path: String,
}

/// Host settings snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preferences: Preferences,
}

impl Settings {
    /// Settings with tracking enabled and the log under `log_path`.
    pub fn tracking(log_path: impl Into<String>) -> Self {
        Self {
            preferences: Preferences {
                enable_state_tracking: true,
                log_path: log_path.into(),
            },
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(raw).map_err(SettingsError::Parse)
    }

    /// Loads settings from a JSON file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(SettingsError::Io(err)),
        }
    }

    /// Writes settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(self).map_err(SettingsError::Parse)?;
        std::fs::write(path.as_ref(), raw).map_err(SettingsError::Io)
    }

    pub fn tracking_enabled(&self) -> bool {
        self.preferences.enable_state_tracking
    }
}
