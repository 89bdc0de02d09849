//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting the size of every regular file for duplicate detection.
//! Traversal is single-threaded and sorted by file name so results are
//! deterministic.
//!
//! # Features
//!
//! - Recursive traversal of all subdirectories
//! - Case-insensitive extension filtering
//! - Cooperative pause/cancel before every directory entry
//! - Absolute, normalized paths
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::control::ScanControl;
//! use mirrormatch::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let control = ScanControl::new();
//! let files: Vec<_> = walker.walk(&control).filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::path_utils::normalize_lexically;
use super::{FileRecord, ScanError, WalkerConfig};
use crate::control::ScanControl;

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk (absolute, normalized when constructed from a resolvable path)
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The root is made absolute against the current directory; if that
    /// fails it is used as given.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = super::path_utils::resolve_absolute(path)
            .unwrap_or_else(|_| normalize_lexically(path));
        Self { root, config }
    }

    /// The resolved root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Unreadable entries are yielded as [`ScanError`] values rather than
    /// stopping iteration. When the scan is cancelled a single
    /// [`ScanError::Interrupted`] is yielded and iteration ends.
    pub fn walk<'a>(
        &'a self,
        control: &'a ScanControl,
    ) -> impl Iterator<Item = Result<FileRecord, ScanError>> + 'a {
        let mut entries = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();
        let mut interrupted = false;

        std::iter::from_fn(move || {
            if interrupted {
                return None;
            }
            loop {
                if control.checkpoint().is_err() {
                    log::debug!("Walker: cancellation requested, stopping iteration");
                    interrupted = true;
                    return Some(Err(ScanError::Interrupted));
                }

                match entries.next()? {
                    Ok(entry) => {
                        if entry.file_type().is_dir() {
                            continue;
                        }
                        if let Some(result) = self.process_entry(entry.path()) {
                            return Some(result);
                        }
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        let err = match e.into_io_error() {
                            Some(io) => ScanError::from_io(path, io),
                            None => ScanError::Io {
                                path,
                                source: std::io::Error::other("filesystem loop detected"),
                            },
                        };
                        log::warn!("Skipping unreadable entry: {}", err);
                        return Some(Err(err));
                    }
                }
            }
        })
    }

    /// Filter one non-directory entry and read its size.
    ///
    /// Returns `None` for entries that are silently skipped: filtered
    /// extensions and anything that is not a regular file.
    fn process_entry(&self, path: &Path) -> Option<Result<FileRecord, ScanError>> {
        let name = path.file_name()?.to_string_lossy();
        if !self.config.accepts_name(&name) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return None;
        }

        // Follows file symlinks, so a link to a regular file is a candidate.
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot read size of {}: {}", path.display(), e);
                return Some(Err(ScanError::from_io(path.to_path_buf(), e)));
            }
        };

        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        Some(Ok(FileRecord::new(
            normalize_lexically(path),
            metadata.len(),
        )))
    }
}
