//! Command-line interface definitions for imgdedupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options control verbosity, color and error format; the `scan` subcommand
//! carries the per-run settings. Every scan setting is optional on the command line
//! so that unset flags fall through to the config file and environment.
//!
//! # Example
//!
//! ```bash
//! # Scan ./input and write ./output.txt
//! imgdedupe scan
//!
//! # Scan a photo library with dHash and also export JSON
//! imgdedupe scan ~/Pictures -o dupes.txt -a dhash --json dupes.json
//!
//! # Verbose mode prints every group
//! imgdedupe -v scan ~/Pictures
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::scanner::{PerceptualAlgorithm, MAX_HASH_SIZE, MIN_HASH_SIZE};

/// Default directory scanned when none is given.
pub const DEFAULT_INPUT: &str = "input";

/// Find duplicate images by perceptual fingerprint.
///
/// imgdedupe walks a directory, fingerprints every image with a perceptual
/// hash, groups identical fingerprints and writes every redundant copy (all
/// but the first-discovered file of each group) to a plain-text list.
#[derive(Debug, Parser)]
#[command(name = "imgdedupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (default: platform config dir/imgdedupe/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for imgdedupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory and write the list of redundant images
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan for images
    #[arg(value_name = "DIR", default_value = DEFAULT_INPUT)]
    pub path: PathBuf,

    /// File receiving the redundant paths, one per line
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Perceptual hashing algorithm
    #[arg(short, long, value_enum)]
    pub algorithm: Option<PerceptualAlgorithm>,

    /// Hash grid edge length; fingerprints are N*N bits (default: 8)
    #[arg(long, value_name = "N", value_parser = parse_hash_size)]
    pub hash_size: Option<u32>,

    /// Number of threads for decoding and hashing (default: 4)
    #[arg(long, value_name = "N", value_parser = parse_threads)]
    pub io_threads: Option<usize>,

    /// Image extensions to consider (can be specified multiple times)
    ///
    /// Replaces the default list when given.
    #[arg(short, long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Also write a JSON report of groups, skipped files and statistics
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Apply flags given on the command line on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref output) = self.output {
            config.output = output.clone();
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(hash_size) = self.hash_size {
            config.hash_size = hash_size;
        }
        if let Some(io_threads) = self.io_threads {
            config.io_threads = io_threads;
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        config
            .ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        config.follow_symlinks |= self.follow_symlinks;
        config.skip_hidden |= self.skip_hidden;
    }
}

/// Parse a hash size between 2 and 64.
///
/// # Errors
///
/// Returns an error if the value is not a number or is out of range.
pub fn parse_hash_size(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if !(MIN_HASH_SIZE..=MAX_HASH_SIZE).contains(&n) {
        return Err(format!(
            "Hash size must be between {MIN_HASH_SIZE} and {MAX_HASH_SIZE}, got {n}"
        ));
    }
    Ok(n)
}

/// Parse a thread count of at least one.
///
/// # Errors
///
/// Returns an error if the value is not a positive number.
pub fn parse_threads(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("Thread count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid number: '{s}'")),
    }
}
