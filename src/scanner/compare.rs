//! Exact byte-for-byte file comparison.
//!
//! Both files are read in equally sized chunks in lockstep. The comparison
//! stops at the first differing chunk, so two large files that differ early
//! are rejected after a single read each.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::control::ScanControl;

/// Result of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Both streams ended together with every chunk equal.
    Identical,
    /// The contents differ, or one of the files could not be read.
    Different,
    /// The scan was cancelled before the comparison finished.
    /// This is an early exit, not a statement about the contents.
    Interrupted,
}

impl Comparison {
    /// True only for [`Comparison::Identical`].
    #[must_use]
    pub fn is_identical(self) -> bool {
        self == Self::Identical
    }
}

/// Compare two files byte for byte, honoring pause and cancel before every chunk.
///
/// Files that cannot be opened or read compare as [`Comparison::Different`].
#[must_use]
pub fn compare_files(a: &Path, b: &Path, chunk_size: usize, control: &ScanControl) -> Comparison {
    let (mut file_a, mut file_b) = match (File::open(a), File::open(b)) {
        (Ok(fa), Ok(fb)) => (fa, fb),
        (Err(e), _) => {
            log::debug!("Cannot open {} for comparison: {}", a.display(), e);
            return Comparison::Different;
        }
        (_, Err(e)) => {
            log::debug!("Cannot open {} for comparison: {}", b.display(), e);
            return Comparison::Different;
        }
    };

    let chunk_size = chunk_size.max(1);
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        if control.checkpoint().is_err() {
            return Comparison::Interrupted;
        }

        let read_a = match read_chunk(&mut file_a, &mut buf_a) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Read failed for {}: {}", a.display(), e);
                return Comparison::Different;
            }
        };
        let read_b = match read_chunk(&mut file_b, &mut buf_b) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Read failed for {}: {}", b.display(), e);
                return Comparison::Different;
            }
        };

        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Comparison::Different;
        }
        if read_a == 0 {
            return Comparison::Identical;
        }
    }
}

/// Decide whether two files are byte-identical.
///
/// Cancellation also yields `false`; check [`ScanControl::is_cancelled`]
/// before treating `false` as a real difference.
#[must_use]
pub fn files_identical(a: &Path, b: &Path, chunk_size: usize, control: &ScanControl) -> bool {
    compare_files(a, b, chunk_size, control).is_identical()
}

/// Fill `buf` from `reader`, stopping early only at end of file.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
