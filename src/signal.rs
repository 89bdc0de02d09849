//! Ctrl+C handling.
//!
//! The process installs one `ctrlc` hook. Each scan registers its
//! [`ScanControl`] with the hook through [`install_handler`]; on interrupt
//! the registered scan is cancelled (which also releases a paused worker),
//! a short notice is printed to stderr, and the scan winds down at its next
//! checkpoint. The CLI then exits with
//! [`ExitCode::Interrupted`](crate::error::ExitCode::Interrupted).
//!
//! # Usage
//!
//! ```rust,no_run
//! use mirrormatch::duplicates::ScanController;
//! use mirrormatch::signal::install_handler;
//!
//! let controller = ScanController::new();
//! install_handler(controller.control()).expect("signal handler");
//! ```

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use crate::control::ScanControl;

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static HOOK_INSTALLED: Mutex<bool> = Mutex::new(false);
static REGISTERED: Mutex<Option<Arc<ScanControl>>> = Mutex::new(None);

fn register(control: Arc<ScanControl>) {
    let mut slot = REGISTERED.lock().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(control);
}

fn on_interrupt() {
    let slot = REGISTERED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(control) = slot.as_ref() {
        control.cancel();
    }

    let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
    let _ = std::io::stderr().flush();
    log::info!("Shutdown signal received");
}

/// Route Ctrl+C to `control`, installing the process hook on first use.
///
/// Later calls only replace the registered control.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be installed,
/// for example because another Ctrl+C handler already owns the signal.
pub fn install_handler(control: Arc<ScanControl>) -> Result<(), SignalError> {
    let mut installed = HOOK_INSTALLED
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if !*installed {
        ctrlc::set_handler(on_interrupt)?;
        *installed = true;
        log::debug!("Ctrl+C hook installed");
    }

    register(control);
    Ok(())
}
