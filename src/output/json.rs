//! JSON output formatter for grouping results.
//!
//! Provides a machine-readable dump for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "fingerprint": "8f3c01d2a4b5c6e7",
//!       "kept": "input/a.png",
//!       "redundant": ["input/c.png"]
//!     }
//!   ],
//!   "skipped": [
//!     { "path": "input/d.heic", "kind": "unsupported", "reason": "unsupported format: ..." }
//!   ],
//!   "summary": {
//!     "total_records": 5,
//!     "hashed": 4,
//!     "skipped": 1,
//!     "distinct_fingerprints": 2,
//!     "unique_images": 0,
//!     "duplicate_groups": 2,
//!     "redundant_files": 2,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "ID000"
//!   }
//! }
//! ```

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use super::{write_atomic, ReportError};
use crate::duplicates::{Group, Grouping, GroupingStats, SkippedFile};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Fingerprint as a hexadecimal string
    pub fingerprint: String,
    /// The first-discovered path, kept as canonical
    pub kept: String,
    /// Every later path with the same fingerprint
    pub redundant: Vec<String>,
}

impl JsonGroup {
    /// Create a JSON group from a duplicate group.
    #[must_use]
    pub fn from_group(group: &Group) -> Self {
        Self {
            fingerprint: group.fingerprint().to_hex(),
            kept: path_string(group.kept()),
            redundant: group.redundant().iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// A file that could not be fingerprinted.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSkipped {
    /// Path of the file
    pub path: String,
    /// Short failure category (`decode`, `unsupported` or `io`)
    pub kind: String,
    /// Failure message
    pub reason: String,
}

impl JsonSkipped {
    /// Create a JSON entry from a skipped file.
    #[must_use]
    pub fn from_skipped(skipped: &SkippedFile) -> Self {
        Self {
            path: path_string(&skipped.path),
            kind: skipped.reason.kind().to_string(),
            reason: skipped.reason.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Grouping counters
    #[serde(flatten)]
    pub stats: GroupingStats,
    /// Duration of the whole scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "ID000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from grouping stats, scan duration and exit code.
    #[must_use]
    pub fn new(stats: GroupingStats, scan_duration: Duration, exit_code: ExitCode) -> Self {
        Self {
            stats,
            scan_duration_ms: scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups in discovery order
    pub groups: Vec<JsonGroup>,
    /// Files that could not be fingerprinted, in scan order
    pub skipped: Vec<JsonSkipped>,
    /// Summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from a grouping.
    ///
    /// # Example
    ///
    /// ```
    /// use imgdedupe::duplicates::{group, Fingerprint, ImageRecord};
    /// use imgdedupe::error::ExitCode;
    /// use imgdedupe::output::json::JsonOutput;
    /// use std::time::Duration;
    ///
    /// let fp = Fingerprint::from(7u64);
    /// let grouping = group(vec![
    ///     ImageRecord::hashed("a.png", fp.clone()),
    ///     ImageRecord::hashed("b.png", fp),
    /// ]);
    ///
    /// let output = JsonOutput::new(&grouping, Duration::ZERO, ExitCode::Success);
    /// assert_eq!(output.groups.len(), 1);
    /// assert_eq!(output.groups[0].redundant, vec!["b.png".to_string()]);
    /// ```
    #[must_use]
    pub fn new(grouping: &Grouping, scan_duration: Duration, exit_code: ExitCode) -> Self {
        Self {
            groups: grouping.duplicates().map(JsonGroup::from_group).collect(),
            skipped: grouping
                .skipped()
                .iter()
                .map(JsonSkipped::from_skipped)
                .collect(),
            summary: JsonSummary::new(grouping.stats(), scan_duration, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W, pretty: bool) -> Result<(), ReportError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        let io = |source: std::io::Error| ReportError::Write {
            path: "<json>".into(),
            source,
        };
        writer.write_all(json.as_bytes()).map_err(io)?;
        writer.write_all(b"\n").map_err(io)?;
        Ok(())
    }

    /// Create or overwrite `path` with pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if the file cannot be written.
    pub fn write_atomic(&self, path: &Path) -> Result<(), ReportError> {
        write_atomic(path, |w| self.write_to(w, true))
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
