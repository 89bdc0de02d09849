//! Cooperative cancel and pause flags shared by every scan stage.
//!
//! A [`ScanControl`] is the only state the scan worker shares with the
//! outside world. The worker polls it at every suspension point (each
//! directory entry, each checksum chunk, each pairwise comparison) via
//! [`ScanControl::checkpoint`], which checks cancellation without blocking
//! and then blocks for as long as the scan is paused.
//!
//! # Example
//!
//! ```
//! use mirrormatch::control::ScanControl;
//! use std::sync::Arc;
//!
//! let control = Arc::new(ScanControl::new());
//! assert!(control.checkpoint().is_ok());
//!
//! control.cancel();
//! assert!(control.checkpoint().is_err());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Marker returned from a suspension point once the scan has been cancelled.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Scan cancelled")]
pub struct Cancelled;

/// Shared cancel and pause flags for one scan.
///
/// Cancellation is sticky: once [`cancel`](Self::cancel) has been called the
/// flag stays set until [`reset`](Self::reset), which must only happen between
/// scans. The pause flag may be toggled freely.
///
/// # Thread Safety
///
/// `ScanControl` is `Send` and `Sync`; share it with `Arc`.
#[derive(Debug, Default)]
pub struct ScanControl {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl ScanControl {
    /// Create a control in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// A worker blocked on a pause is woken so it can unwind.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.lock_paused();
        self.resumed.notify_all();
        log::debug!("Cancellation requested");
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Suspend the worker at its next suspension point.
    pub fn pause(&self) {
        *self.lock_paused() = true;
        log::debug!("Scan paused");
    }

    /// Release a paused worker.
    pub fn resume(&self) {
        *self.lock_paused() = false;
        self.resumed.notify_all();
        log::debug!("Scan resumed");
    }

    /// Flip between paused and running. Returns `true` if now paused.
    pub fn toggle_pause(&self) -> bool {
        let now_paused = {
            let mut paused = self.lock_paused();
            *paused = !*paused;
            *paused
        };
        if !now_paused {
            self.resumed.notify_all();
        }
        now_paused
    }

    /// Check if the scan is currently paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        *self.lock_paused()
    }

    /// Block while paused. Returns early if the scan is cancelled.
    pub fn wait_while_paused(&self) {
        let mut paused = self.lock_paused();
        while *paused && !self.is_cancelled() {
            paused = self
                .resumed
                .wait(paused)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Suspension point: cancel check, then pause wait, then cancel check again.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if cancellation was requested before or while
    /// the worker was paused.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        self.wait_while_paused();
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        Ok(())
    }

    /// Return both flags to the running state for a fresh scan.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        *self.lock_paused() = false;
        self.resumed.notify_all();
    }

    fn lock_paused(&self) -> MutexGuard<'_, bool> {
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
