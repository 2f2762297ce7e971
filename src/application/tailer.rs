//! Resumable read handle bound to one tracked file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::Result;
use crate::infrastructure::CursorStore;

/// Read stream that starts at a file's committed cursor.
///
/// The handle tracks how far it has read or seeked. [`Tailer::close`] commits
/// that position to the cursor store exactly once; the store itself is only
/// written to disk when the owning session closes. Dropping a handle without
/// closing it discards the position.
///
/// After close, reads return end-of-data and seeks fail with
/// [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct Tailer {
    file: Option<File>,
    path: PathBuf,
    store: Arc<CursorStore>,
    start: u64,
    current: u64,
}

impl Tailer {
    pub(crate) fn new(file: File, path: PathBuf, store: Arc<CursorStore>, start: u64) -> Self {
        Self {
            file: Some(file),
            path,
            store,
            start,
            current: start,
        }
    }

    /// Absolute path this handle's cursor is stored under.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offset reading started from.
    #[must_use]
    pub const fn start_offset(&self) -> u64 {
        self.start
    }

    /// Current position, which is what close will commit.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.current
    }

    /// Whether close has already run.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    /// Commits the current offset to the cursor store and releases the file.
    ///
    /// Only the first call has any effect.
    ///
    /// # Errors
    /// Never fails today; always returns `Ok(())`.
    pub fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        self.store.set_cursor(&self.path, self.current);
        drop(file);

        tracing::debug!(
            path = %self.path.display(),
            from = self.start,
            to = self.current,
            "Committed cursor"
        );

        Ok(())
    }
}

impl Read for Tailer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(file) = self.file.as_mut() else {
            return Ok(0);
        };
        let n = file.read(buf)?;
        self.current += n as u64;
        Ok(n)
    }
}

impl Seek for Tailer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let Some(file) = self.file.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "tailer is closed",
            ));
        };
        self.current = file.seek(pos)?;
        Ok(self.current)
    }
}

impl Drop for Tailer {
    fn drop(&mut self) {
        if self.file.is_some() {
            tracing::debug!(
                path = %self.path.display(),
                offset = self.current,
                "Tailer dropped without close, position discarded"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    fn fixture(content: &[u8]) -> (tempfile::TempDir, PathBuf, Arc<CursorStore>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::File::create(&path).unwrap().write_all(content).unwrap();
        let store = Arc::new(CursorStore::load_or_create(dir.path().join("state.json")).unwrap());
        (dir, path, store)
    }

    fn open(path: &Path, store: &Arc<CursorStore>, start: u64) -> Tailer {
        let mut file = File::open(path).unwrap();
        file.seek(SeekFrom::Start(start)).unwrap();
        Tailer::new(file, path.to_path_buf(), Arc::clone(store), start)
    }

    #[test]
    fn test_read_advances_offset() {
        let (_dir, path, store) = fixture(b"hello world");
        let mut tailer = open(&path, &store, 0);

        let mut buf = [0u8; 5];
        tailer.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(tailer.offset(), 5);

        let mut rest = String::new();
        tailer.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, " world");
        assert_eq!(tailer.offset(), 11);
        assert_eq!(store.get_cursor(&path), 0, "nothing is committed before close");
    }

    #[test]
    fn test_close_commits_once() {
        let (_dir, path, store) = fixture(b"0123456789");
        let mut tailer = open(&path, &store, 2);

        let mut buf = [0u8; 3];
        tailer.read_exact(&mut buf).unwrap();
        tailer.close().unwrap();
        assert_eq!(store.get_cursor(&path), 5);

        store.set_cursor(&path, 1);
        tailer.close().unwrap();
        assert_eq!(store.get_cursor(&path), 1, "second close must not commit again");
        assert!(tailer.is_closed());
    }

    #[test]
    fn test_seek_updates_offset() {
        let (_dir, path, store) = fixture(b"0123456789");
        let mut tailer = open(&path, &store, 0);

        assert_eq!(tailer.seek(SeekFrom::End(-3)).unwrap(), 7);
        assert_eq!(tailer.offset(), 7);
        assert_eq!(tailer.seek(SeekFrom::Current(-2)).unwrap(), 5);

        tailer.close().unwrap();
        assert_eq!(store.get_cursor(&path), 5);
    }

    #[test]
    fn test_read_and_seek_after_close() {
        let (_dir, path, store) = fixture(b"0123456789");
        let mut tailer = open(&path, &store, 0);
        tailer.close().unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(tailer.read(&mut buf).unwrap(), 0);
        let err = tailer.seek(SeekFrom::Start(0)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(tailer.offset(), 0);
    }

    #[test]
    fn test_drop_without_close_discards_position() {
        let (_dir, path, store) = fixture(b"0123456789");
        {
            let mut tailer = open(&path, &store, 0);
            let mut sink = Vec::new();
            tailer.read_to_end(&mut sink).unwrap();
        }
        assert_eq!(store.get_cursor(&path), 0);
        assert!(!store.is_dirty());
    }
}
