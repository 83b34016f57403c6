//! Structural differ for pak.
//!
//! Given two trees -- real node trees or virtual regrouped trees, uniformly --
//! the differ aligns children strictly by name, recurses through composite
//! payloads, and classifies every aligned or unaligned node as unchanged,
//! changed, added, or removed. Leaf payloads are compared with type-specific
//! equality semantics, never naive byte equality.
//!
//! # Key Types
//!
//! - [`Comparer`] -- The comparison entry point, configured once per run
//! - [`TreeRef`] -- A real or virtual tree, presented uniformly
//! - [`CompareDifference`] / [`DifferenceKind`] -- One record per classified node
//! - [`CompareConfig`] / [`ImageComparison`] -- Boundary, image, and link toggles

pub mod compare;
pub mod config;
pub mod difference;
pub mod policy;
pub mod tree_ref;

pub use compare::Comparer;
pub use config::{CompareConfig, ImageComparison};
pub use difference::{CompareDifference, DifferenceKind};
pub use tree_ref::TreeRef;
