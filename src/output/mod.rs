//! Report writers for grouping results.
//!
//! This module provides the output formats for a finished grouping:
//! - [`list`]: the plain-text duplicate list, one redundant path per line
//! - [`json`]: a machine-readable dump of groups, skipped files and stats
//!
//! Both writers persist through [`write_atomic`], so a failed run never
//! leaves a half-written file behind.
//!
//! # Example
//!
//! ```no_run
//! use imgdedupe::duplicates::{group, ImageRecord};
//! use imgdedupe::output::list::ListOutput;
//! use std::path::Path;
//!
//! let grouping = group(Vec::<ImageRecord>::new());
//! let report = grouping.report();
//! ListOutput::new(&report).write_atomic(Path::new("output.txt")).unwrap();
//! ```

pub mod json;
pub mod list;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// Re-export main types
pub use json::JsonOutput;
pub use list::ListOutput;

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// The temporary file next to the destination could not be created.
    #[error("Failed to create temporary file in {dir}: {source}")]
    Create {
        /// Directory the temporary file was created in
        dir: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing report content failed.
    #[error("Failed to write report {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The finished temporary file could not replace the destination.
    #[error("Failed to persist report to {path}: {source}")]
    Persist {
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write a file through a temporary sibling and rename it into place.
///
/// `fill` receives a buffered writer over the temporary file. The
/// destination is only replaced once `fill` and the flush both succeed.
/// The result gets the permissions of the file it replaces, or the
/// umask default for a new file.
///
/// # Errors
///
/// Returns a [`ReportError`] if the temporary file cannot be created,
/// written, or persisted over `path`.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<(), ReportError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), ReportError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = path
        .file_name()
        .map(|n| format!(".{}.", n.to_string_lossy()))
        .unwrap_or_else(|| ".report.".to_string());

    let existing = fs::metadata(path).ok().map(|m| m.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Masked by the process umask at creation
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(&dir)
        .map_err(|source| ReportError::Create { dir, source })?;

    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }

    {
        let mut writer = BufWriter::new(temp.as_file());
        fill(&mut writer)?;
        writer.flush().map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    temp.persist(path).map_err(|e| ReportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
