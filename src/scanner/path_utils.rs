//! Path resolution helpers.
//!
//! Every path the engine stores is absolute and lexically normalized, so
//! reports are unambiguous no matter how the root was spelled on the
//! command line (`.`, `../photos`, `~/x/./y`). Normalization is purely
//! lexical: symbolic links are not resolved, matching what the user sees
//! in their file manager.
//!
//! # Example
//!
//! ```
//! use mirrormatch::scanner::path_utils::normalize_lexically;
//! use std::path::{Path, PathBuf};
//!
//! let cleaned = normalize_lexically(Path::new("/data/./photos/../docs"));
//! assert_eq!(cleaned, PathBuf::from("/data/docs"));
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem.
///
/// A `..` at the root stays at the root. Leading `..` components of a
/// relative path are kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => {
                    out.push(Component::ParentDir);
                }
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}

/// Make a path absolute against the current directory and normalize it.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_absolute(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    Ok(normalize_lexically(&absolute))
}

/// Last path component as a display string, used to name reports.
///
/// Falls back to `"root"` for paths like `/` that have no final component.
#[must_use]
pub fn folder_name(path: &Path) -> String {
    normalize_lexically(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}
