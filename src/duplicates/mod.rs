//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (traversal output)
//! - Checksum sub-grouping
//! - Exact byte-level verification
//! - Background scan control (one scan at a time)

pub mod controller;
pub mod finder;
pub mod groups;

pub use controller::{ScanController, ScanHandle, ScanState};
pub use finder::{
    checksum_stage, cluster_identical, scan, validate_root, verify_stage, ChecksumStats,
    DuplicateFinder, FinderConfig, FinderError, ScanOutcome, ScanSummary, VerifyStats,
};
pub use groups::{group_by_size, ChecksumBucket, DuplicateGroup, GroupingStats, SizeBucket};
