//! The fingerprint source: candidate discovery plus parallel hashing.
//!
//! [`FingerprintSource`] walks a root directory, sorts the candidates by
//! full path and turns each one into an [`ImageRecord`]. Hashing runs on a
//! dedicated rayon pool, and the results come back in sorted-path order so
//! the grouper sees a deterministic sequence.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{PerceptualHasher, ScanError, Walker, WalkerConfig};
use crate::duplicates::ImageRecord;
use crate::progress::ProgressCallback;

/// Default number of hashing threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Errors that prevent a scan from starting.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The root directory does not exist.
    #[error("Input directory not found: {0}")]
    PathNotFound(PathBuf),

    /// The root exists but is not a directory.
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Produces one [`ImageRecord`] per candidate image under a root directory.
pub struct FingerprintSource {
    root: PathBuf,
    walker_config: WalkerConfig,
    hasher: PerceptualHasher,
    io_threads: usize,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FingerprintSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FingerprintSource")
            .field("root", &self.root)
            .field("walker_config", &self.walker_config)
            .field("hasher", &self.hasher)
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FingerprintSource {
    /// Create a source rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if `root` is missing or is not a directory.
    pub fn new(
        root: &Path,
        walker_config: WalkerConfig,
        hasher: PerceptualHasher,
    ) -> Result<Self, SourceError> {
        let metadata =
            std::fs::metadata(root).map_err(|_| SourceError::PathNotFound(root.to_path_buf()))?;
        if !metadata.is_dir() {
            return Err(SourceError::NotADirectory(root.to_path_buf()));
        }

        Ok(Self {
            root: root.to_path_buf(),
            walker_config,
            hasher,
            io_threads: DEFAULT_IO_THREADS,
            progress_callback: None,
        })
    }

    /// Set the number of hashing threads (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Root directory being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of hashing threads.
    #[must_use]
    pub fn io_threads(&self) -> usize {
        self.io_threads
    }

    /// Walk the root and return the sorted candidate paths.
    #[must_use]
    pub fn candidates(&self) -> (Vec<PathBuf>, Vec<ScanError>) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let walker = Walker::new(&self.root, self.walker_config.clone());
        let result = walker.candidates();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }
        result
    }

    /// Fingerprint every candidate in parallel.
    ///
    /// Records are returned in sorted-path order regardless of which thread
    /// finished first. Walk errors are returned alongside.
    #[must_use]
    pub fn records(&self) -> (Vec<ImageRecord>, Vec<ScanError>) {
        let (paths, walk_errors) = self.candidates();
        (self.fingerprint_all(paths), walk_errors)
    }

    /// Fingerprint the given paths in parallel, keeping their order.
    #[must_use]
    pub fn fingerprint_all(&self, paths: Vec<PathBuf>) -> Vec<ImageRecord> {
        if paths.is_empty() {
            log::debug!("No candidate images to fingerprint");
            return Vec::new();
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("hashing", paths.len());
        }
        log::info!(
            "Fingerprinting {} images with {} on {} threads",
            paths.len(),
            self.hasher.algorithm(),
            self.io_threads
        );

        let done = AtomicUsize::new(0);
        let hash_one = |path: PathBuf| {
            let record = self.fingerprint_path(path);
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(current, record.path().to_string_lossy().as_ref());
            }
            record
        };

        let records: Vec<ImageRecord> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| paths.into_par_iter().map(hash_one).collect()),
            Err(e) => {
                log::warn!(
                    "Failed to create hashing thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                paths.into_par_iter().map(hash_one).collect()
            }
        };

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("hashing");
        }
        records
    }

    /// Lazily fingerprint candidates one at a time on the calling thread.
    ///
    /// The walk and sort happen up front; each image is decoded only when
    /// the iterator is advanced.
    pub fn records_sequential(
        &self,
    ) -> (impl Iterator<Item = ImageRecord> + '_, Vec<ScanError>) {
        let (paths, walk_errors) = self.candidates();
        let records = paths.into_iter().map(move |path| self.fingerprint_path(path));
        (records, walk_errors)
    }

    fn fingerprint_path(&self, path: PathBuf) -> ImageRecord {
        match self.hasher.fingerprint(&path) {
            Ok(fp) => {
                log::trace!("Fingerprinted {}: {}", path.display(), fp);
                ImageRecord::hashed(path, fp)
            }
            Err(reason) => {
                log::warn!("Failed to load {}: {}", path.display(), reason);
                ImageRecord::failed(path, reason)
            }
        }
    }
}
