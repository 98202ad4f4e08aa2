//! Scanner module for candidate discovery and perceptual fingerprinting.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Extension filtering to image candidates
//! - Perceptual hashing with primary and fallback decoding
//! - Parallel fingerprinting folded back into sorted path order
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate discovery
//! - [`perceptual`]: Image decoding and perceptual hashing
//! - [`source`]: The fingerprint source feeding the grouper
//!
//! # Example
//!
//! ```no_run
//! use imgdedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod perceptual;
pub mod source;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use perceptual::{
    PerceptualAlgorithm, PerceptualHasher, DEFAULT_HASH_SIZE, MAX_HASH_SIZE, MIN_HASH_SIZE,
};
pub use source::{FingerprintSource, SourceError};
pub use walker::Walker;

/// Extensions treated as image candidates when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp"];

/// Configuration for directory walking.
///
/// Controls filtering, symlink handling, and other walk behavior.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    /// These are applied in addition to any .gitignore files.
    pub ignore_patterns: Vec<String>,

    /// Lowercase file extensions (without the dot) that mark a file as a
    /// candidate image.
    pub extensions: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    ///
    /// # Arguments
    ///
    /// * `follow_symlinks` - Whether to follow symbolic links
    /// * `skip_hidden` - Whether to skip hidden files
    /// * `ignore_patterns` - Glob patterns to ignore
    /// * `extensions` - Candidate extensions; case and a leading dot are ignored
    #[must_use]
    pub fn new(
        follow_symlinks: bool,
        skip_hidden: bool,
        ignore_patterns: Vec<String>,
        extensions: Vec<String>,
    ) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
            extensions: normalize_extensions(extensions),
        }
    }

    /// Whether a path carries one of the configured extensions.
    #[must_use]
    pub fn is_candidate(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// Lowercase extensions and strip a leading dot (`".PNG"` → `"png"`).
#[must_use]
pub fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
