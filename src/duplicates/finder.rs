//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Traversal** - Walk the root and group files by size (see [`crate::duplicates::groups`])
//! 2. **Checksum stage** - CRC-32 every member of a multi-file size bucket
//! 3. **Verification stage** - Byte-compare members of each checksum bucket
//!
//! Every stage polls the shared [`ScanControl`] at each suspension point.
//! A cancelled scan resolves to [`ScanOutcome::Cancelled`] and never
//! surfaces partial groups.
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::duplicates::{DuplicateFinder, FinderConfig, ScanOutcome};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_extensions([".jpg"]));
//! match finder.scan(Path::new("/home/user/Pictures")) {
//!     Ok(ScanOutcome::Completed { groups, summary }) => {
//!         println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//!     }
//!     Ok(ScanOutcome::Cancelled) => println!("cancelled"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::groups::{group_by_size, ChecksumBucket, DuplicateGroup, SizeBucket};
use crate::control::{Cancelled, ScanControl};
use crate::progress::ProgressSink;
use crate::scanner::{compare_files, Checksum, Checksummer, Comparison, HashError, ScanError};
use crate::scanner::{FileRecord, Walker, WalkerConfig, DEFAULT_CHUNK_SIZE};

// ============================================================================
// Checksum stage
// ============================================================================

/// Statistics from the checksum stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumStats {
    /// Files that entered the stage (the progress `total`)
    pub input_files: usize,
    /// Files checksummed successfully
    pub checksummed_files: usize,
    /// Files that could not be read
    pub unreadable_files: usize,
    /// Files whose checksum was unique within their size bucket
    pub unique_checksums: usize,
    /// Checksum buckets with 2+ files
    pub candidate_buckets: usize,
}

/// Split every size bucket by checksum (stage 2).
///
/// Each member of each bucket is checksummed in order; unreadable files are
/// dropped. After every file, readable or not, the processed counter
/// advances and `progress` receives `(processed, total)`. When the stage
/// completes, `(total, total)` is delivered if it has not been already.
///
/// Singleton size buckets are ignored and never counted toward `total`.
///
/// # Errors
///
/// Returns [`Cancelled`] if the scan is cancelled; no final progress update
/// is sent in that case.
pub fn checksum_stage(
    size_buckets: Vec<SizeBucket>,
    checksummer: &Checksummer,
    control: &ScanControl,
    progress: Option<&dyn ProgressSink>,
) -> Result<(Vec<ChecksumBucket>, ChecksumStats), Cancelled> {
    let size_buckets: Vec<SizeBucket> = size_buckets
        .into_iter()
        .filter(SizeBucket::has_candidates)
        .collect();
    let total: usize = size_buckets.iter().map(SizeBucket::len).sum();
    let mut stats = ChecksumStats {
        input_files: total,
        ..Default::default()
    };

    log::info!("Checksum stage: {} candidate files", total);

    let mut processed = 0usize;
    let mut last_reported: Option<usize> = None;
    let mut buckets = Vec::new();

    for size_bucket in size_buckets {
        control.checkpoint()?;

        let mut order: Vec<Checksum> = Vec::new();
        let mut by_checksum: HashMap<Checksum, Vec<PathBuf>> = HashMap::new();

        for path in size_bucket.paths {
            control.checkpoint()?;

            match checksummer.checksum(&path) {
                Ok(checksum) => {
                    log::trace!("{} {}", checksum, path.display());
                    stats.checksummed_files += 1;
                    by_checksum
                        .entry(checksum)
                        .or_insert_with(|| {
                            order.push(checksum);
                            Vec::new()
                        })
                        .push(path);
                }
                Err(HashError::Interrupted(_)) => return Err(Cancelled),
                Err(e) => {
                    log::debug!("Excluding unreadable file: {}", e);
                    stats.unreadable_files += 1;
                }
            }

            processed += 1;
            if let Some(sink) = progress {
                sink.on_progress(processed, total);
            }
            last_reported = Some(processed);
        }

        for checksum in order {
            let Some(paths) = by_checksum.remove(&checksum) else {
                continue;
            };
            if paths.len() < 2 {
                stats.unique_checksums += paths.len();
                continue;
            }
            buckets.push(ChecksumBucket {
                size: size_bucket.size,
                checksum,
                paths,
            });
        }
    }

    if last_reported != Some(total) {
        if let Some(sink) = progress {
            sink.on_progress(total, total);
        }
    }

    stats.candidate_buckets = buckets.len();
    log::info!(
        "Checksum stage complete: {} buckets, {} unique, {} unreadable",
        stats.candidate_buckets,
        stats.unique_checksums,
        stats.unreadable_files
    );

    Ok((buckets, stats))
}

// ============================================================================
// Verification stage
// ============================================================================

/// Statistics from the verification stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyStats {
    /// Checksum buckets examined
    pub input_buckets: usize,
    /// Direct pairwise comparisons performed
    pub comparisons: usize,
    /// Files that matched nothing despite sharing a checksum
    pub collisions: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
}

/// Partition `paths` into clusters of mutually identical files.
///
/// Members are visited in order. Each unassigned member opens a cluster and
/// is compared directly against every later unassigned member; matches join
/// the cluster and are marked assigned. Only clusters of two or more are
/// returned.
///
/// Members are only ever compared against the cluster's first member, which
/// relies on byte equality being transitive: if `A == B` and `A == C` then
/// `B == C`, so `B` and `C` are never compared to each other.
///
/// # Errors
///
/// Returns [`Cancelled`] if `compare` reports [`Comparison::Interrupted`] or
/// the control is cancelled before a comparison.
pub fn cluster_identical<F>(
    paths: &[PathBuf],
    control: &ScanControl,
    mut compare: F,
) -> Result<(Vec<Vec<PathBuf>>, usize), Cancelled>
where
    F: FnMut(&Path, &Path) -> Comparison,
{
    let mut assigned = vec![false; paths.len()];
    let mut clusters = Vec::new();
    let mut comparisons = 0usize;

    for i in 0..paths.len() {
        control.checkpoint()?;
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut cluster = vec![paths[i].clone()];

        for j in (i + 1)..paths.len() {
            control.checkpoint()?;
            if assigned[j] {
                continue;
            }
            comparisons += 1;
            match compare(&paths[i], &paths[j]) {
                Comparison::Identical => {
                    assigned[j] = true;
                    cluster.push(paths[j].clone());
                }
                Comparison::Different => {}
                Comparison::Interrupted => return Err(Cancelled),
            }
        }

        if cluster.len() > 1 {
            clusters.push(cluster);
        }
    }

    Ok((clusters, comparisons))
}

/// Confirm duplicates inside every checksum bucket (stage 3).
///
/// # Errors
///
/// Returns [`Cancelled`] if the scan is cancelled.
pub fn verify_stage(
    buckets: Vec<ChecksumBucket>,
    chunk_size: usize,
    control: &ScanControl,
) -> Result<(Vec<DuplicateGroup>, VerifyStats), Cancelled> {
    let mut stats = VerifyStats {
        input_buckets: buckets.len(),
        ..Default::default()
    };
    let mut groups = Vec::new();

    log::info!("Verification stage: {} checksum buckets", buckets.len());

    for bucket in buckets {
        control.checkpoint()?;
        if bucket.len() < 2 {
            continue;
        }

        let (clusters, comparisons) = cluster_identical(&bucket.paths, control, |a, b| {
            compare_files(a, b, chunk_size, control)
        })?;
        stats.comparisons += comparisons;

        let clustered: usize = clusters.iter().map(Vec::len).sum();
        if clustered < bucket.len() {
            log::debug!(
                "Checksum {} collision: {} of {} files differ in content",
                bucket.checksum,
                bucket.len() - clustered,
                bucket.len()
            );
        }
        stats.collisions += bucket.len() - clustered;

        groups.extend(
            clusters
                .into_iter()
                .map(|files| DuplicateGroup::new(bucket.checksum, bucket.size, files)),
        );
    }

    stats.duplicate_groups = groups.len();
    log::info!(
        "Verification stage complete: {} groups after {} comparisons",
        stats.duplicate_groups,
        stats.comparisons
    );

    Ok((groups, stats))
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Walker configuration (extension filter, symlinks).
    pub walker_config: WalkerConfig,
    /// Read chunk size for checksums and comparisons.
    pub chunk_size: usize,
    /// Cancel and pause flags shared with the controller.
    pub control: Arc<ScanControl>,
    /// Optional progress sink for the checksum stage.
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("chunk_size", &self.chunk_size)
            .field("control", &self.control)
            .field("progress", &self.progress.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            control: Arc::new(ScanControl::new()),
            progress: None,
        }
    }
}

impl FinderConfig {
    /// Restrict the scan to these suffixes (empty means all files).
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.walker_config = self.walker_config.with_extensions(extensions);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the read chunk size. Zero is clamped to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Share cancel/pause flags with an external controller.
    #[must_use]
    pub fn with_control(mut self, control: Arc<ScanControl>) -> Self {
        self.control = control;
        self
    }

    /// Set the progress sink.
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanSummary {
    /// Regular files that passed the extension filter and had a readable size
    pub total_files: usize,
    /// Files in multi-member size buckets (the progress total)
    pub candidate_files: usize,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files eliminated because their checksum was unique within their size
    pub eliminated_by_checksum: usize,
    /// Files skipped because they could not be read
    pub unreadable_files: usize,
    /// Files that shared a checksum but matched nothing byte for byte
    pub checksum_collisions: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Copies beyond the first in every group
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_space: u64,
    /// Wall-clock duration of the scan
    #[serde(with = "duration_secs")]
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Human-readable reclaimable space.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

/// Terminal result of a scan that passed input validation.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Every stage finished. `groups` may be empty.
    Completed {
        /// Confirmed duplicate groups
        groups: Vec<DuplicateGroup>,
        /// Statistics about the scan
        summary: ScanSummary,
    },
    /// The scan was cancelled; nothing partial is reported.
    Cancelled,
}

impl ScanOutcome {
    /// True if the scan was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The groups of a completed scan, or `None` if cancelled.
    #[must_use]
    pub fn groups(&self) -> Option<&[DuplicateGroup]> {
        match self {
            Self::Completed { groups, .. } => Some(groups),
            Self::Cancelled => None,
        }
    }
}

/// Errors that reject a scan before it starts.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No root folder was supplied.
    #[error("No folder selected")]
    EmptyRoot,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Another scan is still running.
    #[error("A scan is already in progress")]
    ScanInProgress,

    /// The scan worker thread could not be started or panicked.
    #[error("Scan worker failed: {0}")]
    Worker(String),
}

/// Check a root path before any scan work starts.
///
/// # Errors
///
/// [`FinderError::EmptyRoot`] for an empty path, [`FinderError::PathNotFound`]
/// or [`FinderError::NotADirectory`] otherwise.
pub fn validate_root(path: &Path) -> Result<(), FinderError> {
    if path.as_os_str().is_empty() {
        return Err(FinderError::EmptyRoot);
    }
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Duplicate finder that runs the whole pipeline on the calling thread.
///
/// # Example
///
/// ```no_run
/// use mirrormatch::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(8192));
/// let outcome = finder.scan(Path::new("/some/path")).unwrap();
/// println!("cancelled: {}", outcome.is_cancelled());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    checksummer: Checksummer,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let checksummer = Checksummer::new()
            .with_chunk_size(config.chunk_size)
            .with_control(Arc::clone(&config.control));
        Self {
            config,
            checksummer,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files beneath `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the path is empty, missing or not a
    /// directory. Cancellation is not an error; it is reported as
    /// [`ScanOutcome::Cancelled`].
    pub fn scan(&self, path: &Path) -> Result<ScanOutcome, FinderError> {
        validate_root(path)?;
        Ok(self.run(path).unwrap_or(ScanOutcome::Cancelled))
    }

    fn run(&self, path: &Path) -> Result<ScanOutcome, Cancelled> {
        let start_time = std::time::Instant::now();
        let control = self.config.control.as_ref();
        let mut summary = ScanSummary::default();

        log::info!("Starting duplicate scan of {}", path.display());
        control.checkpoint()?;

        // Traversal
        let walker = Walker::new(path, self.config.walker_config.clone());
        let mut files: Vec<FileRecord> = Vec::new();
        for result in walker.walk(control) {
            match result {
                Ok(file) => files.push(file),
                Err(ScanError::Interrupted) => {
                    log::info!("Scan cancelled during traversal");
                    return Err(Cancelled);
                }
                Err(e) => {
                    log::debug!("Skipping: {}", e);
                    summary.unreadable_files += 1;
                }
            }
        }

        let (size_buckets, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.candidate_files = size_stats.potential_duplicates;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Traversal complete: {} files, {} candidates ({:.1}% eliminated by size)",
            size_stats.total_files,
            size_stats.potential_duplicates,
            size_stats.elimination_rate()
        );

        // Checksums
        let progress = self.config.progress.as_deref();
        let (checksum_buckets, checksum_stats) =
            checksum_stage(size_buckets, &self.checksummer, control, progress).inspect_err(
                |_| log::info!("Scan cancelled during checksum stage"),
            )?;
        summary.eliminated_by_checksum = checksum_stats.unique_checksums;
        summary.unreadable_files += checksum_stats.unreadable_files;

        // Verification
        let (groups, verify_stats) =
            verify_stage(checksum_buckets, self.config.chunk_size, control)
                .inspect_err(|_| log::info!("Scan cancelled during verification"))?;

        summary.checksum_collisions = verify_stats.collisions;
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::redundant_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok(ScanOutcome::Completed { groups, summary })
    }
}

/// Scan `root` for duplicates on the calling thread.
///
/// `extensions` uses lowercase dotted suffixes such as `.txt`; `None` or an
/// empty slice accepts every file.
///
/// # Errors
///
/// Returns [`FinderError`] for invalid input. Cancellation yields
/// `Ok(ScanOutcome::Cancelled)`.
///
/// # Example
///
/// ```no_run
/// use mirrormatch::control::ScanControl;
/// use mirrormatch::duplicates::scan;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let control = Arc::new(ScanControl::new());
/// let outcome = scan(Path::new("."), Some(&[".txt".to_string()]), None, control).unwrap();
/// ```
pub fn scan(
    root: &Path,
    extensions: Option<&[String]>,
    progress: Option<Arc<dyn ProgressSink>>,
    control: Arc<ScanControl>,
) -> Result<ScanOutcome, FinderError> {
    let mut config = FinderConfig::default()
        .with_extensions(extensions.unwrap_or_default())
        .with_control(control);
    config.progress = progress;
    DuplicateFinder::new(config).scan(root)
}
