//! Scanner module for directory traversal and file content inspection.
//!
//! This module provides functionality for:
//! - Recursive directory walking with an extension filter
//! - Streaming CRC-32 checksums
//! - Byte-for-byte comparison of two files
//! - Absolute, lexically normalized paths
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`checksum`]: CRC-32 file checksums (streaming)
//! - [`compare`]: Exact lockstep comparison of two files
//! - [`path_utils`]: Path resolution helpers
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::control::ScanControl;
//! use mirrormatch::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::default().with_extensions([".txt", "md"]);
//! let control = ScanControl::new();
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk(&control) {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod checksum;
pub mod compare;
pub mod path_utils;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use checksum::{file_checksum, Checksum, Checksummer, DEFAULT_CHUNK_SIZE};
pub use compare::{compare_files, files_identical, Comparison};
pub use walker::Walker;

/// A regular file discovered during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute, normalized path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Allowed file name suffixes, lowercase with a leading dot.
    /// Empty means every file is accepted.
    pub extensions: Vec<String>,

    /// Descend into symbolic links to directories.
    /// Warning: symlink cycles are not detected.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Replace the extension filter. Entries are normalized with
    /// [`normalize_extensions`].
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = normalize_extensions(extensions);
        self
    }

    /// Set whether directory symlinks are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Check a file name against the extension filter (case-insensitive suffix match).
    #[must_use]
    pub fn accepts_name(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Normalize user-supplied extensions to lowercase suffixes with a leading dot.
///
/// Blank entries are dropped and duplicates removed, keeping first-seen order.
///
/// # Example
///
/// ```
/// use mirrormatch::scanner::normalize_extensions;
///
/// let exts = normalize_extensions(["PNG", ".jpg", " .png ", ""]);
/// assert_eq!(exts, vec![".png".to_string(), ".jpg".to_string()]);
/// ```
#[must_use]
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ext in extensions {
        let trimmed = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
        if trimmed.is_empty() {
            continue;
        }
        let dotted = format!(".{trimmed}");
        if !normalized.contains(&dotted) {
            normalized.push(dotted);
        }
    }
    normalized
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Traversal stopped because the scan was cancelled.
    #[error("Traversal interrupted")]
    Interrupted,
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Errors that can occur while checksumming a file.
///
/// Every variant means "unreadable for this scan"; the file is dropped
/// from its checksum bucket.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Checksumming stopped because the scan was cancelled.
    #[error("Checksum interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
