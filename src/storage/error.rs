//! Storage error types.
//!
//! Reads that fail are treated as "value absent" by the callers, and writes
//! are best-effort, so these errors mostly end up in log lines.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SettingsError;

/// Errors that can occur in the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The home directory could not be determined.
    #[error("home directory not found")]
    HomeDirNotFound,

    /// Reading or writing the store file failed.
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but is not a JSON object of strings.
    #[error("store file is corrupt: {0}")]
    Corrupt(String),

    /// A value could not be encoded for storage.
    #[error("failed to encode value for '{key}': {message}")]
    Encode { key: String, message: String },

    /// Settings were rejected before being written.
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::HomeDirNotFound => "Pass --data-dir to choose where timer data is kept",
            Self::Io { .. } => "Check that the data directory is writable",
            Self::Corrupt(_) => "Delete the store file to start over with defaults",
            Self::Encode { .. } => "Report this as a bug",
            Self::InvalidSettings(err) => err.suggestion(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::io(
            "/tmp/store.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/store.json"));
        assert!(err.to_string().contains("denied"));

        let err = StoreError::Corrupt("expected value".to_string());
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn test_invalid_settings_from_settings_error() {
        let err: StoreError = SettingsError::ZeroValue("focus duration").into();
        assert!(matches!(err, StoreError::InvalidSettings(_)));
        assert!(err.to_string().contains("focus duration"));
        assert!(err.suggestion().contains("1 or more"));
    }

    #[test]
    fn test_suggestion() {
        assert!(StoreError::HomeDirNotFound.suggestion().contains("--data-dir"));
        assert!(StoreError::Corrupt("x".into()).suggestion().contains("Delete"));
    }
}
