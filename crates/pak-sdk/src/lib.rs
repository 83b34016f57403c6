//! High-level comparison facade.
//!
//! [`ArchiveComparer`] wires the overlay and the differ together: given two
//! archive roots it decides whether physically split sub-archives need to be
//! regrouped first, runs one comparison per declared type, and returns a
//! per-type report with summary counts and any grouping conflicts met along
//! the way.
//!
//! # Key Types
//!
//! - [`ArchiveComparer`] -- Entry point for whole-archive comparisons
//! - [`ComparisonReport`] -- Per-type reports keyed by declared type
//! - [`TypeReport`] / [`DiffSummary`] -- Records and counts for one type

pub mod comparer;

pub use comparer::{ArchiveComparer, ComparisonReport, DiffSummary, TypeReport};
