//! Output formatters for scan results.
//!
//! - CSV report file (the default result sink)
//! - Plain text for the terminal
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::duplicates::DuplicateFinder;
//! use mirrormatch::output::csv::CsvReport;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let outcome = finder.scan(Path::new(".")).unwrap();
//! if let Some(groups) = outcome.groups() {
//!     CsvReport::new(groups).write_to(std::io::stdout()).unwrap();
//! }
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

pub use csv::{report_file_name, write_report, CsvReport, ReportError};
pub use json::JsonOutput;
pub use text::TextOutput;

/// Open `path` with the platform's default application.
///
/// Returns once the opener process has exited.
///
/// # Errors
///
/// Returns an error if the opener cannot be run or exits unsuccessfully.
pub fn open_report(path: &Path) -> io::Result<()> {
    let command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(path);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(path);
        c
    };
    run_opener(command, path)
}

fn run_opener(mut command: Command, path: &Path) -> io::Result<()> {
    // The opener hands the file to the desktop and exits, so waiting is brief.
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(io::Error::other(format!("opener exited with {status}")));
    }
    log::debug!("Opened {}", path.display());
    Ok(())
}
