//! Fingerprint grouping: the fold from image records to duplicate groups.
//!
//! # Overview
//!
//! The grouper consumes [`ImageRecord`]s in the order supplied and:
//! 1. Appends failed records to the skipped list, leaving groups untouched
//! 2. Appends hashed records to the group for their fingerprint, creating it
//!    on first sight
//!
//! The first path to produce a fingerprint becomes the group's kept copy.
//! Groups come back in the order their fingerprint was first seen, so a
//! rerun on identical input yields identical output.
//!
//! The fold does no I/O and never fails. It can be driven all at once with
//! [`group`] or one record at a time with [`DuplicateGrouper::push`].
//!
//! # Example
//!
//! ```
//! use imgdedupe::duplicates::{group, FailureReason, Fingerprint, ImageRecord};
//!
//! let h1 = Fingerprint::from(1u64);
//! let records = vec![
//!     ImageRecord::hashed("a.png", h1.clone()),
//!     ImageRecord::failed("b.heic", FailureReason::Unsupported("heic".into())),
//!     ImageRecord::hashed("c.png", h1.clone()),
//! ];
//!
//! let grouping = group(records);
//! assert_eq!(grouping.get(&h1).unwrap().paths().len(), 2);
//! assert_eq!(grouping.skipped().len(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::groups::{DuplicateReport, Fingerprint, Group, ImageRecord, SkippedFile};

/// Accounting for one grouping run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Records consumed
    pub total_records: usize,
    /// Records with a fingerprint
    pub hashed: usize,
    /// Records that could not be fingerprinted
    pub skipped: usize,
    /// Number of distinct fingerprints (singleton and duplicate groups)
    pub distinct_fingerprints: usize,
    /// Groups holding exactly one path
    pub unique_images: usize,
    /// Groups holding two or more paths
    pub duplicate_groups: usize,
    /// Paths reported for removal (duplicate group members minus heads)
    pub redundant_files: usize,
}

/// Incremental fingerprint grouper.
///
/// Owns its map for the whole run. Feed records with [`push`](Self::push),
/// then call [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct DuplicateGrouper {
    /// Fingerprint to position in `groups`
    index: HashMap<Fingerprint, usize>,
    /// Groups in fingerprint discovery order
    groups: Vec<Group>,
    skipped: Vec<SkippedFile>,
}

impl DuplicateGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the grouping.
    pub fn push(&mut self, record: ImageRecord) {
        let (path, outcome) = record.into_parts();
        match outcome {
            Ok(fingerprint) => self.insert(fingerprint, path),
            Err(reason) => {
                log::debug!("Skipping {}: {}", path.display(), reason);
                self.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    fn insert(&mut self, fingerprint: Fingerprint, path: PathBuf) {
        match self.index.get(&fingerprint) {
            Some(&slot) => {
                log::trace!("{} joins group {}", path.display(), fingerprint);
                self.groups[slot].push(path);
            }
            None => {
                log::trace!("{} opens group {}", path.display(), fingerprint);
                self.index.insert(fingerprint.clone(), self.groups.len());
                self.groups.push(Group::new(fingerprint, path));
            }
        }
    }

    /// Number of records consumed so far.
    #[must_use]
    pub fn records_seen(&self) -> usize {
        self.skipped.len() + self.groups.iter().map(Group::len).sum::<usize>()
    }

    /// Finish the run and hand back the read-only result.
    #[must_use]
    pub fn finish(self) -> Grouping {
        let grouping = Grouping {
            index: self.index,
            groups: self.groups,
            skipped: self.skipped,
        };

        for g in grouping.groups() {
            log::debug!(
                "{} :: {} :: {:?}",
                g.len(),
                g.fingerprint(),
                g.paths()
            );
        }

        let stats = grouping.stats();
        log::debug!(
            "Grouping complete: {} records → {} fingerprints, {} duplicate groups, {} skipped",
            stats.total_records,
            stats.distinct_fingerprints,
            stats.duplicate_groups,
            stats.skipped
        );

        grouping
    }
}

impl Extend<ImageRecord> for DuplicateGrouper {
    fn extend<T: IntoIterator<Item = ImageRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Group records by fingerprint in a single pass.
///
/// The input may be a lazily produced, single-pass iterator. For reproducible
/// output it must arrive in a deterministic order (the source yields sorted
/// path order).
#[must_use]
pub fn group(records: impl IntoIterator<Item = ImageRecord>) -> Grouping {
    let mut grouper = DuplicateGrouper::new();
    grouper.extend(records);
    grouper.finish()
}

/// Result of one grouping run.
///
/// Groups are exposed by shared reference only. The kept copy of a group can be
/// read through [`Group::kept`] but never reaches [`DuplicateReport`].
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    index: HashMap<Fingerprint, usize>,
    groups: Vec<Group>,
    skipped: Vec<SkippedFile>,
}

impl Grouping {
    /// All groups, singletons included, in fingerprint discovery order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Look up the group for a fingerprint.
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&Group> {
        self.index.get(fingerprint).map(|&slot| &self.groups[slot])
    }

    /// Files that could not be fingerprinted, in arrival order.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    /// Groups with exactly one path.
    pub fn unique(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| !g.is_duplicate())
    }

    /// Groups with two or more paths.
    pub fn duplicates(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }

    /// Read-only view used by the report writers.
    #[must_use]
    pub fn report(&self) -> DuplicateReport<'_> {
        DuplicateReport::new(&self.groups)
    }

    /// Every path the run saw, in no particular order: heads, redundant and skipped.
    pub fn all_paths(&self) -> impl Iterator<Item = &Path> {
        self.groups
            .iter()
            .flat_map(|g| g.paths().iter().map(PathBuf::as_path))
            .chain(self.skipped.iter().map(|s| s.path.as_path()))
    }

    /// Whether the run saw no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.skipped.is_empty()
    }

    /// Compute run statistics.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let hashed: usize = self.groups.iter().map(Group::len).sum();
        let duplicate_groups = self.duplicates().count();
        let redundant_files = self.duplicates().map(|g| g.len() - 1).sum();

        GroupingStats {
            total_records: hashed + self.skipped.len(),
            hashed,
            skipped: self.skipped.len(),
            distinct_fingerprints: self.groups.len(),
            unique_images: self.groups.len() - duplicate_groups,
            duplicate_groups,
            redundant_files,
        }
    }
}
