//! Durable cursor store.
//!
//! Maps absolute file paths to the byte offset a consumer has read up to.
//! Changes are buffered in memory and written out by [`CursorStore::save`],
//! which writes a sibling temp file and renames it over the state file so a
//! half-written state is never visible at the canonical path.
//!
//! Keys are the UTF-8 rendering of each path; bytes that are not valid UTF-8
//! become U+FFFD, so any path can be tracked and saved.
//!
//! Every access to the mapping goes through one internal mutex, so a store
//! can be shared between threads behind an `Arc` without further locking.
//! Nothing coordinates separate processes saving to the same file; the last
//! rename wins.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::domain::{AppError, Result};

/// On-disk layout of the state file.
#[derive(Debug, Default, Deserialize)]
struct StateDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    cursors: BTreeMap<String, u64>,
}

#[derive(Serialize)]
struct StateDocumentRef<'a> {
    cursors: &'a BTreeMap<String, u64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default)]
struct Inner {
    cursors: BTreeMap<String, u64>,
    dirty: bool,
}

impl Inner {
    fn set(&mut self, abs_path: &Path, offset: u64) {
        let key = cursor_key(abs_path);
        if self.cursors.get(key.as_ref()) != Some(&offset) {
            self.cursors.insert(key.into_owned(), offset);
            self.dirty = true;
        }
    }
}

/// Key a path is stored under in the state document.
fn cursor_key(abs_path: &Path) -> Cow<'_, str> {
    abs_path.to_string_lossy()
}

/// In-memory cursor mapping bound to a state file.
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl CursorStore {
    /// Loads the store from `path`, or starts empty if the file is missing or empty.
    ///
    /// A missing file also gets its parent directory created so the first save
    /// has somewhere to land.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or decoded, or if
    /// the parent directory cannot be created.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                ensure_parent_dir(&path)
                    .map_err(|e| AppError::io("Failed to create state directory", e))?;
                tracing::debug!(path = %path.display(), "No state file, starting empty");
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(AppError::state_load(&path, e)),
        };

        if bytes.is_empty() {
            tracing::debug!(path = %path.display(), "Empty state file, starting empty");
            return Ok(Self::empty(path));
        }

        let doc: StateDocument =
            serde_json::from_slice(&bytes).map_err(|e| AppError::state_decode(&path, e))?;

        tracing::debug!(
            path = %path.display(),
            cursors = doc.cursors.len(),
            "Loaded cursor state"
        );

        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                cursors: doc.cursors,
                dirty: false,
            }),
        })
    }

    fn empty(path: PathBuf) -> Self {
        Self {
            path,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The mapping only holds plain integers, so a panic elsewhere cannot
        // leave it half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Location of the backing state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Committed offset for `abs_path`, or 0 if the path is unknown.
    #[must_use]
    pub fn get_cursor(&self, abs_path: &Path) -> u64 {
        self.lock()
            .cursors
            .get(cursor_key(abs_path).as_ref())
            .copied()
            .unwrap_or(0)
    }

    /// Sets the offset for `abs_path`. Only marks the store dirty if the value changed.
    pub fn set_cursor(&self, abs_path: &Path, offset: u64) {
        self.lock().set(abs_path, offset);
    }

    /// Forgets `abs_path`, so the next read starts from the beginning.
    pub fn reset_cursor(&self, abs_path: &Path) {
        let mut inner = self.lock();
        if inner.cursors.remove(cursor_key(abs_path).as_ref()).is_some() {
            inner.dirty = true;
        }
    }

    /// Sets the offset for `abs_path`, clamping negative values to 0.
    pub fn reset_cursor_to(&self, abs_path: &Path, offset: i64) {
        let offset = u64::try_from(offset).unwrap_or(0);
        self.lock().set(abs_path, offset);
    }

    /// Whether in-memory state differs from what was last loaded or saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().cursors.len()
    }

    /// Whether no path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().cursors.is_empty()
    }

    /// Snapshot of every tracked path and offset, sorted by path.
    #[must_use]
    pub fn entries(&self) -> Vec<(PathBuf, u64)> {
        self.lock()
            .cursors
            .iter()
            .map(|(path, offset)| (PathBuf::from(path), *offset))
            .collect()
    }

    /// Atomically writes the mapping to the state file.
    ///
    /// The lock is held until the rename completes so an update racing with
    /// the save is never hidden behind a cleared dirty flag.
    ///
    /// # Errors
    /// Returns error if the mapping cannot be serialized, or the directory,
    /// temp file or rename fails. The previous state file is left untouched.
    pub fn save(&self) -> Result<()> {
        let mut inner = self.lock();

        ensure_parent_dir(&self.path)
            .map_err(|e| AppError::state_save("Failed to create state directory", e))?;

        let mut data = serde_json::to_vec_pretty(&StateDocumentRef {
            cursors: &inner.cursors,
        })
        .map_err(|e| AppError::state_save("Failed to serialize cursors", e.into()))?;
        data.push(b'\n');

        let tmp = temp_path(&self.path);
        if let Err(e) = write_synced(&tmp, &data) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::state_save(
                format!("Failed to write {}", tmp.display()),
                e,
            ));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::state_save(
                format!("Failed to replace {}", self.path.display()),
                e,
            ));
        }

        inner.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            cursors = inner.cursors.len(),
            "Saved cursor state"
        );

        Ok(())
    }
}

/// Sibling temp file used while saving: `<path>.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
