//! JSON output for scripting.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "root": "/data",
//!   "duplicates": [
//!     {
//!       "checksum": "9a0364b9",
//!       "size": 4,
//!       "duplicate_count": 2,
//!       "files": ["/data/a.txt", "/data/b.txt"]
//!     }
//!   ],
//!   "summary": { "total_files": 3, "duplicate_groups": 1, "...": "..." },
//!   "exit_code": 0,
//!   "exit_code_name": "MM000"
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// CRC-32 as eight lowercase hex digits
    pub checksum: String,
    /// File size in bytes
    pub size: u64,
    /// Number of files in the group
    pub duplicate_count: usize,
    /// Absolute paths, in discovery order
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            checksum: group.checksum_hex(),
            size: group.size,
            duplicate_count: group.len(),
            files: group
                .files
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Complete JSON document for one scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Scanned folder
    pub root: String,
    /// Confirmed groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan statistics
    pub summary: &'a ScanSummary,
    /// Process exit code for this run
    pub exit_code: i32,
    /// Machine-readable exit code name (e.g. "MM000")
    pub exit_code_name: &'static str,
}

impl<'a> JsonOutput<'a> {
    /// Build the document from a completed scan.
    ///
    /// # Example
    ///
    /// ```
    /// use mirrormatch::duplicates::ScanSummary;
    /// use mirrormatch::error::ExitCode;
    /// use mirrormatch::output::json::JsonOutput;
    /// use std::path::Path;
    ///
    /// let summary = ScanSummary::default();
    /// let output = JsonOutput::new(Path::new("/data"), &[], &summary, ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(
        root: &Path,
        groups: &[DuplicateGroup],
        summary: &'a ScanSummary,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            root: root.to_string_lossy().into_owned(),
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            summary,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
        }
    }

    /// Serialize to a pretty-printed string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer).map_err(serde_json::Error::io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Checksum;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_group_fields() {
        let group = DuplicateGroup::new(
            Checksum(0xcbf4_3926),
            9,
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")],
        );
        let summary = ScanSummary {
            total_files: 4,
            duplicate_groups: 1,
            scan_duration: Duration::from_millis(1500),
            ..Default::default()
        };

        let output = JsonOutput::new(Path::new("/"), &[group], &summary, ExitCode::Success);
        let value: serde_json::Value =
            serde_json::from_str(&output.to_json_pretty().unwrap()).unwrap();

        let first = &value["duplicates"][0];
        assert_eq!(first["checksum"], "cbf43926");
        assert_eq!(first["size"], 9);
        assert_eq!(first["duplicate_count"], 3);
        assert_eq!(first["files"][2], "/c");
        assert_eq!(value["summary"]["total_files"], 4);
        assert_eq!(value["summary"]["scan_duration"], 1.5);
        assert_eq!(value["exit_code_name"], "MM000");
    }

    #[test]
    fn test_write_to_ends_with_newline() {
        let summary = ScanSummary::default();
        let output = JsonOutput::new(Path::new("/data"), &[], &summary, ExitCode::NoDuplicates);

        let mut buffer = Vec::new();
        output.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"root\": \"/data\""));
    }
}
