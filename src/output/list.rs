//! Plain-text duplicate list.
//!
//! One redundant path per line, LF-terminated, with no header and no group
//! separators. Groups appear in discovery order and paths in arrival order;
//! the kept copy of each group is never written.
//!
//! Paths are written as their raw OS bytes, so a name that is not valid
//! UTF-8 still names the real file. Such lines are logged at warn level.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::{write_atomic, ReportError};
use crate::duplicates::DuplicateReport;

/// Writer for the duplicate list.
#[derive(Debug, Clone)]
pub struct ListOutput<'a> {
    report: &'a DuplicateReport<'a>,
}

impl<'a> ListOutput<'a> {
    /// Create a list writer over a report.
    #[must_use]
    pub fn new(report: &'a DuplicateReport<'a>) -> Self {
        Self { report }
    }

    /// Lines that will be written, as raw path bytes without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.report.redundant_paths().map(path_bytes)
    }

    /// Write the list to any writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            if std::str::from_utf8(line).is_err() {
                log::warn!(
                    "Path is not valid UTF-8, writing raw bytes: {}",
                    String::from_utf8_lossy(line)
                );
            }
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Create or overwrite `path` with the list.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the file cannot be written. An existing
    /// file at `path` is left untouched in that case.
    pub fn write_atomic(&self, path: &Path) -> Result<(), ReportError> {
        write_atomic(path, |w| {
            self.write_to(w).map_err(|source| ReportError::Write {
                path: PathBuf::from(path),
                source,
            })
        })?;
        log::debug!(
            "Duplicate list with {} paths written to {}",
            self.report.redundant_count(),
            path.display()
        );
        Ok(())
    }

    /// Render the list into a string for display.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; use
    /// [`ListOutput::write_to`] for the exact file content.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&String::from_utf8_lossy(line));
            out.push('\n');
        }
        out
    }
}

fn path_bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes().trim_ascii()
}
