//! Layered application configuration.
//!
//! Settings are merged with `figment`, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file passed
//!    with `--config`
//! 3. `IMGDEDUPE_*` environment variables (e.g. `IMGDEDUPE_HASH_SIZE=16`)
//! 4. Command-line flags, applied by the caller
//!
//! A config file that does not exist is skipped. A file that exists but
//! cannot be parsed is an error, and so is a value outside the range the
//! command line accepts.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::source::DEFAULT_IO_THREADS;
use crate::scanner::{
    PerceptualAlgorithm, PerceptualHasher, WalkerConfig, DEFAULT_EXTENSIONS, DEFAULT_HASH_SIZE,
    MAX_HASH_SIZE, MIN_HASH_SIZE,
};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "IMGDEDUPE_";

/// Default report destination.
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Perceptual hashing algorithm.
    pub algorithm: PerceptualAlgorithm,
    /// Hash grid edge length; fingerprints are `hash_size²` bits.
    pub hash_size: u32,
    /// Threads used to decode and hash images.
    pub io_threads: usize,
    /// Extensions treated as candidate images.
    pub extensions: Vec<String>,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Duplicate list destination.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: PerceptualAlgorithm::default(),
            hash_size: DEFAULT_HASH_SIZE,
            io_threads: DEFAULT_IO_THREADS,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
            skip_hidden: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// `explicit` replaces the platform config file when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is malformed, a value has the
    /// wrong type, or a value is out of range.
    pub fn load(explicit: Option<&Path>) -> Result<Self, figment::Error> {
        let file = explicit.map(Path::to_path_buf).or_else(default_config_path);
        let config: Self = Self::figment(file.as_deref()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges the command line enforces at parse time.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key.
    pub fn validate(&self) -> Result<(), figment::Error> {
        if !(MIN_HASH_SIZE..=MAX_HASH_SIZE).contains(&self.hash_size) {
            return Err(figment::Error::from(format!(
                "hash_size must be between {MIN_HASH_SIZE} and {MAX_HASH_SIZE}, got {}",
                self.hash_size
            )));
        }
        if self.io_threads == 0 {
            return Err(figment::Error::from(
                "io_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the provider stack without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
            } else {
                log::debug!("Config file {} not found, skipping", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.ignore_patterns.clone(),
            self.extensions.clone(),
        )
    }

    /// Hasher built from the configured algorithm and size.
    #[must_use]
    pub fn hasher(&self) -> PerceptualHasher {
        PerceptualHasher::with_hash_size(self.algorithm, self.hash_size)
    }
}

/// Platform config file location, e.g. `~/.config/imgdedupe/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "imgdedupe").map(|dirs| dirs.config_dir().join("config.toml"))
}
