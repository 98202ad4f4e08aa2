//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The image record data model (fingerprint or failure per file)
//! - Exact-fingerprint grouping in discovery order
//! - The duplicate report view (redundant paths only)

pub mod grouper;
pub mod groups;

pub use grouper::{group, DuplicateGrouper, Grouping, GroupingStats};
pub use groups::{DuplicateReport, FailureReason, Fingerprint, Group, ImageRecord, SkippedFile};
