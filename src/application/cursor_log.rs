//! Cursor log session.
//!
//! A [`CursorLog`] owns one cursor store for the length of a run. Files are
//! opened through it as [`Tailer`]s positioned at their committed cursor, and
//! [`CursorLog::close`] persists every cursor the tailers committed.
//!
//! Delivery is at-least-once: if the process dies before `close`, the next
//! session resumes from the last saved offsets and may re-read data.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{AppError, CursorStatus, Result};
use crate::infrastructure::{resolve_tracked_path, CursorStore};

use super::tailer::Tailer;

/// Session over a single cursor state file.
#[derive(Debug)]
pub struct CursorLog {
    store: Arc<CursorStore>,
}

impl CursorLog {
    /// Loads or creates the cursor state at `state_path`.
    ///
    /// # Errors
    /// Returns error if an existing state file cannot be read or decoded.
    pub fn new(state_path: impl AsRef<Path>) -> Result<Self> {
        let store = CursorStore::load_or_create(state_path)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Location of the state file.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        self.store.path()
    }

    /// Key a file's cursor is stored under.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_tracked_path(path)
    }

    /// Opens `path` positioned at its committed cursor.
    ///
    /// If the file shrank below the cursor, reading starts at the current end
    /// of the file instead.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened, statted or positioned.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Tailer> {
        let abs = self.resolve(path.as_ref());

        let mut file = File::open(&abs).map_err(|e| AppError::open(&abs, e))?;
        let size = file.metadata().map_err(|e| AppError::stat(&abs, e))?.len();

        let stored = self.store.get_cursor(&abs);
        let start = stored.min(size);
        if start < stored {
            tracing::debug!(
                path = %abs.display(),
                stored,
                size,
                "File shrank below cursor, starting at end"
            );
        }

        file.seek(SeekFrom::Start(start))
            .map_err(|e| AppError::Seek {
                path: abs.clone(),
                offset: start,
                source: e,
            })?;

        Ok(Tailer::new(file, abs, Arc::clone(&self.store), start))
    }

    /// Forgets the cursor for `path`.
    pub fn reset(&self, path: impl AsRef<Path>) {
        self.store.reset_cursor(&self.resolve(path.as_ref()));
    }

    /// Sets the cursor for `path`; negative offsets become 0.
    pub fn reset_to(&self, path: impl AsRef<Path>, offset: i64) {
        self.store
            .reset_cursor_to(&self.resolve(path.as_ref()), offset);
    }

    /// Every stored cursor with the current size of its file.
    #[must_use]
    pub fn cursors(&self) -> Vec<CursorStatus> {
        self.store
            .entries()
            .into_iter()
            .map(|(path, offset)| {
                let file_size = std::fs::metadata(&path).ok().map(|m| m.len());
                CursorStatus {
                    path,
                    offset,
                    file_size,
                }
            })
            .collect()
    }

    /// Persists the cursor state. Calling it again re-saves the current state.
    ///
    /// # Errors
    /// Returns error if the state file cannot be written; the previous file
    /// is left in place.
    pub fn close(&self) -> Result<()> {
        self.store.save()
    }
}
