//! Background scan controller.
//!
//! [`ScanController`] runs the [`DuplicateFinder`] pipeline on a worker
//! thread and exposes the scan life cycle:
//!
//! ```text
//! Idle -> Scanning <-> Paused -> Completed | Cancelled
//! ```
//!
//! The controller and the worker communicate only through the shared
//! [`ScanControl`] flags, the progress sink, and the worker's return value.
//! Only one scan may be active at a time.
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::duplicates::{FinderConfig, ScanController};
//! use std::path::Path;
//!
//! let controller = ScanController::new();
//! let handle = controller.start(Path::new("/data"), FinderConfig::default()).unwrap();
//!
//! controller.pause();
//! controller.resume();
//!
//! let outcome = handle.wait().unwrap();
//! println!("cancelled: {}", outcome.is_cancelled());
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::finder::{validate_root, DuplicateFinder, FinderConfig, FinderError, ScanOutcome};
use crate::control::ScanControl;

/// Observable scan life-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No scan has run, or the last one was rejected or failed.
    Idle,
    /// The worker is making progress.
    Scanning,
    /// The worker is blocked at a suspension point.
    Paused,
    /// The last scan finished without cancellation.
    Completed,
    /// The last scan was cancelled.
    Cancelled,
}

#[derive(Debug)]
struct Shared {
    state: ScanState,
    started: Option<Instant>,
}

/// Resets a scan that never reported a terminal state (worker panic).
struct ActiveGuard(Arc<Mutex<Shared>>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let mut shared = lock(&self.0);
        if shared.state == ScanState::Scanning {
            shared.state = ScanState::Idle;
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a running scan.
pub struct ScanHandle {
    handle: JoinHandle<Result<ScanOutcome, FinderError>>,
}

impl ScanHandle {
    /// Check if the worker has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker exits and return its outcome.
    ///
    /// # Errors
    ///
    /// Returns the worker's [`FinderError`], or [`FinderError::Worker`] if
    /// the worker panicked.
    pub fn wait(self) -> Result<ScanOutcome, FinderError> {
        self.handle
            .join()
            .map_err(|_| FinderError::Worker("scan worker panicked".to_string()))?
    }
}

/// Owner of the cooperative flags and the one-scan-at-a-time rule.
#[derive(Debug)]
pub struct ScanController {
    control: Arc<ScanControl>,
    shared: Arc<Mutex<Shared>>,
}

impl Default for ScanController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            control: Arc::new(ScanControl::new()),
            shared: Arc::new(Mutex::new(Shared {
                state: ScanState::Idle,
                started: None,
            })),
        }
    }

    /// The flags every scan started by this controller polls.
    #[must_use]
    pub fn control(&self) -> Arc<ScanControl> {
        Arc::clone(&self.control)
    }

    /// Start a scan of `root` on a background thread.
    ///
    /// The controller's flags replace any control set on `config` and are
    /// reset to the running state.
    ///
    /// # Errors
    ///
    /// [`FinderError::ScanInProgress`] if a scan is active, the validation
    /// errors of [`validate_root`], or [`FinderError::Worker`] if the thread
    /// cannot be spawned.
    pub fn start(&self, root: &Path, config: FinderConfig) -> Result<ScanHandle, FinderError> {
        let mut shared = lock(&self.shared);
        if shared.state == ScanState::Scanning {
            log::warn!("Rejecting scan of {}: a scan is already running", root.display());
            return Err(FinderError::ScanInProgress);
        }
        validate_root(root)?;

        self.control.reset();
        let config = config.with_control(Arc::clone(&self.control));
        let root: PathBuf = root.to_path_buf();
        let worker_shared = Arc::clone(&self.shared);

        let handle = std::thread::Builder::new()
            .name("mirrormatch-scan".to_string())
            .spawn(move || {
                let guard = ActiveGuard(worker_shared);
                let result = DuplicateFinder::new(config).scan(&root);
                let mut shared = lock(&guard.0);
                shared.state = match &result {
                    Ok(ScanOutcome::Completed { .. }) => ScanState::Completed,
                    Ok(ScanOutcome::Cancelled) => ScanState::Cancelled,
                    Err(_) => ScanState::Idle,
                };
                result
            })
            .map_err(|e| FinderError::Worker(e.to_string()))?;

        shared.state = ScanState::Scanning;
        shared.started = Some(Instant::now());
        Ok(ScanHandle { handle })
    }

    /// Current life-cycle state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        let state = lock(&self.shared).state;
        if state == ScanState::Scanning && self.control.is_paused() && !self.control.is_cancelled()
        {
            ScanState::Paused
        } else {
            state
        }
    }

    /// True while a worker is running (scanning or paused).
    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.shared).state == ScanState::Scanning
    }

    /// Pause the active scan. Returns `false` if no scan is active.
    pub fn pause(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.control.pause();
        true
    }

    /// Resume the active scan. Returns `false` if no scan is active.
    pub fn resume(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.control.resume();
        true
    }

    /// Toggle pause on the active scan. Returns the new paused state, or
    /// `None` if no scan is active.
    pub fn toggle_pause(&self) -> Option<bool> {
        if !self.is_active() {
            return None;
        }
        Some(self.control.toggle_pause())
    }

    /// Cancel the active scan. Returns `false` if no scan is active.
    pub fn cancel(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.control.cancel();
        self.control.resume();
        true
    }

    /// Time since the current or last scan started.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        lock(&self.shared).started.map(|t| t.elapsed())
    }
}
