//! Streaming CRC-32 file checksums.
//!
//! # Overview
//!
//! The checksum is a weak digest used only to split same-size files into
//! smaller buckets before exact comparison. Files are read in fixed-size
//! chunks so memory use is bounded by the chunk size, not the file size.
//!
//! The algorithm is CRC-32/ISO-HDLC (the zlib/PNG CRC) seeded with 0,
//! rendered as eight lowercase hex digits.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::HashError;
use crate::control::ScanControl;

/// Default read chunk size (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A CRC-32 checksum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum(pub u32);

impl Checksum {
    /// Render as eight lowercase hex digits.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:08x}", self.0)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Chunked CRC-32 calculator with optional cooperative control.
///
/// # Example
///
/// ```no_run
/// use mirrormatch::scanner::Checksummer;
/// use std::path::Path;
///
/// let checksummer = Checksummer::new();
/// let checksum = checksummer.checksum(Path::new("file.bin")).unwrap();
/// println!("{}", checksum);
/// ```
#[derive(Debug, Clone)]
pub struct Checksummer {
    chunk_size: usize,
    control: Option<Arc<ScanControl>>,
}

impl Default for Checksummer {
    fn default() -> Self {
        Self::new()
    }
}

impl Checksummer {
    /// Create a checksummer with the default chunk size and no control.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            control: None,
        }
    }

    /// Set the read chunk size. Zero is clamped to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Poll this control before every chunk.
    #[must_use]
    pub fn with_control(mut self, control: Arc<ScanControl>) -> Self {
        self.control = Some(control);
        self
    }

    /// Compute the checksum of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read, or
    /// [`HashError::Interrupted`] if the scan is cancelled mid-file.
    pub fn checksum(&self, path: &Path) -> Result<Checksum, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        let mut buffer = vec![0u8; self.chunk_size];
        let mut hasher = crc32fast::Hasher::new();

        loop {
            if let Some(ref control) = self.control {
                if control.checkpoint().is_err() {
                    return Err(HashError::Interrupted(path.to_path_buf()));
                }
            }

            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(Checksum(hasher.finalize()))
    }
}

/// Compute the CRC-32 of a file without cooperative control.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read.
pub fn file_checksum(path: &Path, chunk_size: usize) -> Result<Checksum, HashError> {
    Checksummer::new().with_chunk_size(chunk_size).checksum(path)
}
