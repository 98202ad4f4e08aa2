//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting candidate image paths for fingerprinting.
//! It uses [`jwalk`] for parallel directory walking.
//!
//! # Features
//!
//! - Parallel directory traversal using rayon thread pool
//! - Configurable symlink following
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Hidden file filtering
//! - Extension filtering to image candidates
//! - Deterministic, lexicographically sorted candidate list
//!
//! # Example
//!
//! ```no_run
//! use imgdedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! let (candidates, errors) = walker.candidates();
//! println!("{} images, {} unreadable entries", candidates.len(), errors.len());
//! ```

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{ScanError, WalkerConfig};

/// Directory walker for parallel candidate discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build gitignore matcher from config patterns and .gitignore file.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        // Add local .gitignore if it exists
        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) => {
                if gitignore.is_empty() {
                    None
                } else {
                    Some(gitignore)
                }
            }
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: &Option<Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        // Gitignore matching expects paths relative to the root with forward slashes.
        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched_path_or_any_parents(normalized_path, is_dir)
            .is_ignore()
    }

    /// Walk the directory tree, yielding candidate image paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Output order follows the walk (children sorted per
    /// directory); use [`candidates`](Self::candidates) for the fully sorted list.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) => {
                let path = entry.path();

                if path == self.root {
                    return None;
                }

                let file_type = entry.file_type();
                if file_type.is_dir() {
                    return None;
                }

                if self.should_ignore(&path, false, &gitignore) {
                    log::trace!("Ignoring file: {}", path.display());
                    return None;
                }

                if file_type.is_symlink() && !self.config.follow_symlinks {
                    log::trace!("Skipping symlink: {}", path.display());
                    return None;
                }

                if !self.config.is_candidate(&path) {
                    log::trace!("Skipping non-image file: {}", path.display());
                    return None;
                }

                let metadata = if self.config.follow_symlinks {
                    std::fs::metadata(&path)
                } else {
                    std::fs::symlink_metadata(&path)
                };

                match metadata {
                    Ok(m) if m.is_file() => Some(Ok(path)),
                    Ok(_) => None,
                    Err(e) => Some(self.handle_io_error(&path, e)),
                }
            }
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                Some(self.handle_jwalk_error(path, e))
            }
        })
    }

    /// Collect every candidate, sorted lexicographically by full path string.
    ///
    /// The sort compares the raw OS strings, so `a.png` precedes `a/z.png`.
    /// Walk errors are returned alongside and never abort the collection.
    #[must_use]
    pub fn candidates(&self) -> (Vec<PathBuf>, Vec<ScanError>) {
        let mut paths = Vec::new();
        let mut errors = Vec::new();

        for entry in self.walk() {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => errors.push(e),
            }
        }

        sort_paths(&mut paths);
        log::debug!(
            "Found {} candidate images under {} ({} walk errors)",
            paths.len(),
            self.root.display(),
            errors.len()
        );

        (paths, errors)
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> Result<PathBuf, ScanError> {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                Err(ScanError::PermissionDenied(path.to_path_buf()))
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                Err(ScanError::NotFound(path.to_path_buf()))
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                Err(ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                })
            }
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> Result<PathBuf, ScanError> {
        log::warn!("Walker error for {}: {}", path.display(), error);
        Err(ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        })
    }
}

/// Sort paths by their raw OS string, byte for byte.
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
}
