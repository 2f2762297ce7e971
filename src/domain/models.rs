//! Domain models for tracked files and their cursors.

use std::path::PathBuf;

use serde::Serialize;

/// A stored cursor paired with what is currently on disk for that file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorStatus {
    /// Absolute path of the tracked file.
    pub path: PathBuf,
    /// Committed byte offset.
    pub offset: u64,
    /// Current size of the file, `None` if it could not be statted.
    pub file_size: Option<u64>,
}

impl CursorStatus {
    /// Bytes appended since the cursor was committed.
    ///
    /// A file smaller than its cursor has been truncated and has nothing unread
    /// until it grows past the clamped position.
    #[must_use]
    pub fn unread_bytes(&self) -> Option<u64> {
        self.file_size.map(|size| size.saturating_sub(self.offset))
    }

    /// Whether the file shrank below the committed offset.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.file_size.is_some_and(|size| size < self.offset)
    }
}

/// Outcome of tailing a single file.
#[derive(Debug)]
pub struct TailOutcome {
    /// Path as given by the caller.
    pub path: PathBuf,
    /// Offset reading started from.
    pub start_offset: u64,
    /// Offset committed on close.
    pub end_offset: u64,
    /// Lines written to the output.
    pub lines: u64,
    /// Bytes written to the output, excluding appended newlines.
    pub bytes: u64,
    /// Failure that stopped this file, if any.
    pub error: Option<super::AppError>,
}

impl TailOutcome {
    pub(crate) fn failed(path: PathBuf, error: super::AppError) -> Self {
        Self {
            path,
            start_offset: 0,
            end_offset: 0,
            lines: 0,
            bytes: 0,
            error: Some(error),
        }
    }
}

/// Aggregate of a multi-file tail run.
#[derive(Debug, Default)]
pub struct TailSummary {
    /// Per-file outcomes in the order files were given.
    pub outcomes: Vec<TailOutcome>,
}

impl TailSummary {
    /// Total lines written across files.
    #[must_use]
    pub fn total_lines(&self) -> u64 {
        self.outcomes.iter().map(|o| o.lines).sum()
    }

    /// Outcomes that ended in an error.
    pub fn failures(&self) -> impl Iterator<Item = &TailOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// Whether any file failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}
