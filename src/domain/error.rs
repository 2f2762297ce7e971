//! Domain-level error types for cursorlog.
//!
//! All errors are typed with `thiserror` and carry the path or operation
//! that failed so callers can report per-file failures without guessing.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced by the cursor store, the session and the CLI layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// The state file exists but could not be read.
    #[error("Failed to read state file {path}: {message}")]
    StateLoad {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The state file exists but does not hold a valid cursor document.
    #[error("Corrupt state file {path}: {message}")]
    StateDecode {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Persisting the state file failed; the previous file is left in place.
    #[error("Failed to save state: {message}")]
    StateSave {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A tracked file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tracked file was opened but could not be statted.
    #[error("Failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Positioning a tracked file at its cursor failed.
    #[error("Failed to seek {path} to offset {offset}: {source}")]
    Seek {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed outside the state store.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a state load error for an unreadable state file.
    pub fn state_load(path: &Path, err: std::io::Error) -> Self {
        Self::StateLoad {
            path: path.to_path_buf(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a state decode error from a JSON failure.
    pub fn state_decode(path: &Path, err: serde_json::Error) -> Self {
        Self::StateDecode {
            path: path.to_path_buf(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a state save error with context.
    pub fn state_save(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::StateSave {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an open error for a tracked file.
    pub fn open(path: &Path, err: std::io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source: err,
        }
    }

    /// Create a stat error for a tracked file.
    pub fn stat(path: &Path, err: std::io::Error) -> Self {
        Self::Stat {
            path: path.to_path_buf(),
            source: err,
        }
    }

    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
