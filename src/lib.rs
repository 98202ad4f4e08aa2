//! imgdedupe - Perceptual Duplicate Image Finder
//!
//! Walks a directory, fingerprints every image with a perceptual hash, groups
//! files whose fingerprints are identical and lists every redundant copy (all
//! but the first-discovered file of each group) in a plain-text report.
//!
//! The pipeline has three stages:
//! - [`scanner`]: candidate discovery and parallel fingerprinting
//! - [`duplicates`]: the order-preserving fold into groups
//! - [`output`]: the duplicate list and the optional JSON export

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;

use crate::cli::{Cli, Commands, ScanArgs};
use crate::config::Config;
use crate::duplicates::{group, Grouping};
use crate::error::ExitCode;
use crate::output::{JsonOutput, ListOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{FingerprintSource, SourceError};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the input directory
/// is unusable, or a report cannot be written. Images that fail to decode
/// are not errors.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    if logging::init_logging(cli.verbose, cli.quiet, cli.no_color).is_err() {
        log::debug!("Logger already initialized");
    }

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(ref args) => {
            args.apply_to(&mut config);
            let show_progress = !cli.quiet && !args.no_progress;
            run_scan(args, &config, show_progress)
        }
    }
}

fn run_scan(args: &ScanArgs, config: &Config, show_progress: bool) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    log::debug!("Effective configuration: {config:?}");

    let progress: Option<Arc<dyn ProgressCallback>> = if show_progress {
        Some(Arc::new(Progress::new(false)))
    } else {
        None
    };

    let grouping = find_duplicates(&args.path, config, progress)
        .with_context(|| format!("Cannot scan {}", args.path.display()))?;

    log_summary(&grouping);

    let report = grouping.report();
    ListOutput::new(&report)
        .write_atomic(&config.output)
        .with_context(|| format!("Failed to write report {}", config.output.display()))?;
    log::info!("Duplicate list written to {}", config.output.display());

    let exit_code = ExitCode::Success;
    if let Some(ref json_path) = args.json {
        JsonOutput::new(&grouping, start.elapsed(), exit_code)
            .write_atomic(json_path)
            .with_context(|| format!("Failed to write JSON report {}", json_path.display()))?;
        log::info!("JSON report written to {}", json_path.display());
    }

    log::debug!("Run finished in {:.2?}", start.elapsed());
    Ok(exit_code)
}

/// Scan `root` and group its images by fingerprint.
///
/// Walk errors and undecodable images are logged and do not fail the scan;
/// undecodable images end up in [`Grouping::skipped`].
///
/// # Errors
///
/// Returns a [`SourceError`] if `root` is missing or is not a directory.
pub fn find_duplicates(
    root: &Path,
    config: &Config,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<Grouping, SourceError> {
    let mut source = FingerprintSource::new(root, config.walker_config(), config.hasher())?
        .with_io_threads(config.io_threads);
    if let Some(callback) = progress {
        source = source.with_progress_callback(callback);
    }

    let (records, walk_errors) = source.records();
    if !walk_errors.is_empty() {
        log::warn!(
            "{} entries under {} could not be read",
            walk_errors.len(),
            root.display()
        );
    }

    Ok(group(records))
}

fn log_summary(grouping: &Grouping) {
    let stats = grouping.stats();
    log::info!(
        "Scanned {} images: {} duplicate groups, {} redundant files, {} skipped",
        stats.total_records,
        stats.duplicate_groups,
        stats.redundant_files,
        stats.skipped
    );
    for skipped in grouping.skipped() {
        log::info!("  skipped {}: {}", skipped.path.display(), skipped.reason);
    }
}
