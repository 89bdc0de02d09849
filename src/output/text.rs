//! Plain-text listing of duplicate groups for the terminal.

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::progress::format_time;

/// Human-readable report of groups and scan statistics.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write every group followed by a summary block.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (idx, group) in self.groups.iter().enumerate() {
            writeln!(
                writer,
                "Group {} [{}] {} files x {}",
                idx + 1,
                group.checksum_hex(),
                group.len(),
                ByteSize::b(group.size)
            )?;
            for path in &group.files {
                writeln!(writer, "  {}", path.display())?;
            }
            writeln!(writer)?;
        }

        let s = self.summary;
        writeln!(writer, "Files scanned:     {}", s.total_files)?;
        writeln!(writer, "Candidates:        {}", s.candidate_files)?;
        writeln!(writer, "Duplicate groups:  {}", s.duplicate_groups)?;
        writeln!(writer, "Duplicate files:   {}", s.duplicate_files)?;
        writeln!(writer, "Reclaimable:       {}", s.reclaimable_display())?;
        if s.unreadable_files > 0 {
            writeln!(writer, "Unreadable files:  {}", s.unreadable_files)?;
        }
        writeln!(
            writer,
            "Elapsed:           {}",
            format_time(s.scan_duration.as_secs())
        )?;
        Ok(())
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
