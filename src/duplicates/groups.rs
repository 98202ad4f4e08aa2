//! Data model for fingerprint grouping.
//!
//! # Overview
//!
//! Every discovered image becomes an [`ImageRecord`]: a path plus either a
//! [`Fingerprint`] or the [`FailureReason`] it could not be hashed. The grouper
//! folds records into [`Group`]s keyed by fingerprint.
//!
//! A [`Group`] keeps its paths in arrival order. The first path is the kept
//! copy; every later path is redundant. Groups are read-only once built: only
//! shared slices are handed out.
//!
//! # Example
//!
//! ```
//! use imgdedupe::duplicates::{Fingerprint, ImageRecord};
//!
//! let record = ImageRecord::hashed("a.png", Fingerprint::from(0xdead_beef_u64));
//! assert!(record.fingerprint().is_some());
//! assert_eq!(record.fingerprint().unwrap().to_hex(), "00000000deadbeef");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Opaque perceptual fingerprint of an image.
///
/// Two images with equal fingerprints are duplicates. Fingerprints can be
/// hashed and compared for equality but have no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Box<[u8]>);

impl Fingerprint {
    /// Create a fingerprint from raw hash bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.into())
    }

    /// Raw hash bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Fingerprint width in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.0.len() * 8
    }

    /// Lowercase hexadecimal rendering.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl From<u64> for Fingerprint {
    fn from(value: u64) -> Self {
        Self::from_bytes(&value.to_be_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Why a candidate file produced no fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    /// No available decoder could turn the file into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// The file is not in an image format we can decode.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(String),
}

impl FailureReason {
    /// Short machine-friendly name of the failure kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Unsupported(_) => "unsupported",
            Self::Io(_) => "io",
        }
    }
}

/// One discovered file and the outcome of hashing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    path: PathBuf,
    outcome: Result<Fingerprint, FailureReason>,
}

impl ImageRecord {
    /// Create a record from a path and a hashing outcome.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, outcome: Result<Fingerprint, FailureReason>) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }

    /// Create a successfully hashed record.
    #[must_use]
    pub fn hashed(path: impl Into<PathBuf>, fingerprint: Fingerprint) -> Self {
        Self::new(path, Ok(fingerprint))
    }

    /// Create a record for a file that could not be hashed.
    #[must_use]
    pub fn failed(path: impl Into<PathBuf>, reason: FailureReason) -> Self {
        Self::new(path, Err(reason))
    }

    /// Path of the discovered file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The fingerprint, if hashing succeeded.
    #[must_use]
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.outcome.as_ref().ok()
    }

    /// The failure reason, if hashing failed.
    #[must_use]
    pub fn failure(&self) -> Option<&FailureReason> {
        self.outcome.as_ref().err()
    }

    /// Split into path and outcome.
    #[must_use]
    pub fn into_parts(self) -> (PathBuf, Result<Fingerprint, FailureReason>) {
        (self.path, self.outcome)
    }
}

/// A file that was discovered but could not be fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path of the file
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: FailureReason,
}

/// All paths that produced one fingerprint, in arrival order.
///
/// Never empty. Index 0 is the kept copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    fingerprint: Fingerprint,
    paths: Vec<PathBuf>,
}

impl Group {
    pub(crate) fn new(fingerprint: Fingerprint, first: PathBuf) -> Self {
        Self {
            fingerprint,
            paths: vec![first],
        }
    }

    pub(crate) fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Fingerprint shared by every path in this group.
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// All paths in arrival order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The canonical copy: the first path that produced this fingerprint.
    #[must_use]
    pub fn kept(&self) -> &Path {
        &self.paths[0]
    }

    /// Every path except the kept copy.
    #[must_use]
    pub fn redundant(&self) -> &[PathBuf] {
        &self.paths[1..]
    }

    /// Number of paths in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether this group has no paths. Never true for a built group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether this group holds more than one path.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.paths.len() > 1
    }
}

/// Read-only view over the duplicate groups of a run.
///
/// Only groups with two or more paths appear, in discovery order. The kept
/// copy of each group is never yielded by [`DuplicateReport::redundant_paths`].
#[derive(Debug, Clone)]
pub struct DuplicateReport<'a> {
    groups: Vec<&'a Group>,
}

impl<'a> DuplicateReport<'a> {
    pub(crate) fn new(groups: impl IntoIterator<Item = &'a Group>) -> Self {
        Self {
            groups: groups.into_iter().filter(|g| g.is_duplicate()).collect(),
        }
    }

    /// Duplicate groups in discovery order.
    #[must_use]
    pub fn groups(&self) -> &[&'a Group] {
        &self.groups
    }

    /// Redundant paths: group order first, then arrival order within a group.
    pub fn redundant_paths(&self) -> impl Iterator<Item = &'a Path> + '_ {
        self.groups
            .iter()
            .copied()
            .flat_map(|g| g.redundant().iter().map(PathBuf::as_path))
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of redundant files.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.groups.iter().map(|g| g.len() - 1).sum()
    }
}
