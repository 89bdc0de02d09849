//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the bucket types that carry candidates from one
//! stage of the pipeline to the next:
//!
//! - [`SizeBucket`]: files sharing an exact byte length (traversal output)
//! - [`ChecksumBucket`]: files sharing a size *and* a CRC-32 (checksum stage output)
//! - [`DuplicateGroup`]: files proven byte-identical (verification output)
//!
//! ## Size Grouping
//!
//! Size grouping is the first filter. Files with different sizes cannot be
//! duplicates, so only buckets with two or more members move on.
//!
//! # Example
//!
//! ```
//! use mirrormatch::scanner::FileRecord;
//! use mirrormatch::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{Checksum, FileRecord};

/// Files sharing an exact byte length, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Paths with this exact size
    pub paths: Vec<PathBuf>,
}

impl SizeBucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            paths: Vec::new(),
        }
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check if this bucket could contain duplicates (2+ files).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.paths.len() > 1
    }
}

/// Files sharing both a size and a checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumBucket {
    /// Size shared by every member
    pub size: u64,
    /// CRC-32 shared by every member
    pub checksum: Checksum,
    /// Member paths in the order they were checksummed
    pub paths: Vec<PathBuf>,
}

impl ChecksumBucket {
    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Confirmed group of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// CRC-32 of the content, as eight hex digits when serialized
    pub checksum: Checksum,
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Two or more paths with identical content
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(checksum: Checksum, size: u64, files: Vec<PathBuf>) -> Self {
        Self {
            checksum,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Checksum as lowercase hex.
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        self.checksum.to_hex()
    }

    /// Copies beyond the first one.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.redundant_count() as u64
    }
}

/// Statistics from size grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files that entered grouping
    pub total_files: usize,
    /// Distinct sizes seen
    pub unique_sizes: usize,
    /// Files with a size nobody else has (eliminated)
    pub eliminated_unique: usize,
    /// Files in buckets with 2+ members
    pub potential_duplicates: usize,
    /// Buckets with 2+ members
    pub candidate_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition files by exact size, keeping only buckets with 2+ members.
///
/// Buckets are returned in the order their size was first seen and each
/// bucket keeps its files in discovery order.
#[must_use]
pub fn group_by_size(files: Vec<FileRecord>) -> (Vec<SizeBucket>, GroupingStats) {
    let mut stats = GroupingStats {
        total_files: files.len(),
        ..Default::default()
    };

    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut buckets: Vec<SizeBucket> = Vec::new();

    for file in files {
        let slot = *index.entry(file.size).or_insert_with(|| {
            buckets.push(SizeBucket::new(file.size));
            buckets.len() - 1
        });
        buckets[slot].paths.push(file.path);
    }

    stats.unique_sizes = buckets.len();

    let candidates: Vec<SizeBucket> = buckets
        .into_iter()
        .filter(SizeBucket::has_candidates)
        .collect();

    stats.candidate_buckets = candidates.len();
    stats.potential_duplicates = candidates.iter().map(SizeBucket::len).sum();
    stats.eliminated_unique = stats.total_files - stats.potential_duplicates;

    (candidates, stats)
}
