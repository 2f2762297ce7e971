//! Path resolution for tracked files.
//!
//! Cursor keys are absolute, lexically normalized paths. Resolution is best
//! effort: when the working directory cannot be determined the caller's path
//! is used verbatim rather than failing the operation.

use std::path::{Component, Path, PathBuf};

/// Resolves `path` to the key used in the cursor store.
///
/// Symlinks are not followed, so a path that no longer exists can still be
/// reset under the same key it was tracked with.
#[must_use]
pub fn resolve_tracked_path(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(abs) => normalize(&abs),
        Err(e) => {
            tracing::trace!(path = %path.display(), error = %e, "Using path verbatim");
            path.to_path_buf()
        }
    }
}

/// Removes `.` components and folds `..` into its parent without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays at the root.
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
