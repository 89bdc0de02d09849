//! CSV report of duplicate groups.
//!
//! One row per file, every field quoted, CRLF line endings:
//!
//! ```text
//! "checksum","file_path","duplicate_count"
//! "9a0364b9","/data/a.txt","2"
//! "9a0364b9","/data/b.txt","2"
//!
//!
//! ```
//!
//! `duplicate_count` is the number of files in the row's group. Each group
//! is followed by two empty lines.
//!
//! # Example
//!
//! ```no_run
//! use mirrormatch::output::csv::CsvReport;
//!
//! let report = CsvReport::new(&[]);
//! report.write_to(std::io::stdout()).unwrap();
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::scanner::path_utils::folder_name;

const HEADER: [&str; 3] = ["checksum", "file_path", "duplicate_count"];
const GROUP_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Errors while producing a CSV report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV encoding.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The report file could not be created.
    #[error("Cannot create report {path}: {source}")]
    Create {
        /// Report path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

/// CSV formatter over confirmed groups.
pub struct CsvReport<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvReport<'a> {
    /// Create a formatter for `groups`.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write the report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReportError> {
        let mut header = record_writer(&mut writer);
        header.write_record(HEADER)?;
        header.flush()?;
        drop(header);

        for group in self.groups {
            let checksum = group.checksum_hex();
            let count = group.len().to_string();
            let mut rows = record_writer(&mut writer);
            for path in &group.files {
                let path = path.to_string_lossy();
                rows.write_record([checksum.as_str(), &*path, count.as_str()])?;
            }
            rows.flush()?;
            drop(rows);
            // Blank rows bypass the encoder, which would quote an empty field.
            writer.write_all(GROUP_SEPARATOR)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Render the report as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if encoding fails.
    pub fn to_string(&self) -> Result<String, ReportError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn record_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .has_headers(false)
        .from_writer(writer)
}

/// Default report file name for a scan of `root` finished at `when`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use mirrormatch::output::csv::report_file_name;
/// use std::path::Path;
///
/// let when = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
/// assert_eq!(
///     report_file_name(Path::new("/home/me/Photos"), when),
///     "duplicate_files_Photos_070324T090501.csv"
/// );
/// ```
#[must_use]
pub fn report_file_name(root: &Path, when: DateTime<Local>) -> String {
    format!(
        "duplicate_files_{}_{}.csv",
        folder_name(root),
        when.format("%d%m%yT%H%M%S")
    )
}

/// Write the report to `path`, returning the path written.
///
/// # Errors
///
/// Returns [`ReportError::Create`] if the file cannot be created, or the
/// errors of [`CsvReport::write_to`].
pub fn write_report(groups: &[DuplicateGroup], path: &Path) -> Result<PathBuf, ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    CsvReport::new(groups).write_to(&mut writer)?;
    writer.flush()?;
    log::info!("Report written to {}", path.display());
    Ok(path.to_path_buf())
}
