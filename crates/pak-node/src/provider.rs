//! The provider interface: the only thing the comparison engine knows about
//! where a tree comes from.
//!
//! A provider owns the underlying archive data for the duration of a
//! comparison and fulfills extraction synchronously. Implementations must
//! satisfy these invariants:
//!
//! - `try_extract` returns `false` on failure; it never panics and never
//!   leaves the node's child list half-populated.
//! - Extraction and release are idempotent.
//! - The archive data is treated as immutable while a comparison runs;
//!   concurrent read-only access from multiple comparisons is safe.

use crate::node::NodeHandle;
use crate::value::{ArchiveKind, Value};

/// Access to lazily-loaded subtrees and declared archive metadata.
pub trait NodeProvider: Send + Sync {
    /// Materialize the children of a composite node (image subtree, nested
    /// archive). Returns `false` if the subtree cannot be loaded.
    fn try_extract(&self, node: &NodeHandle) -> bool;

    /// Release a subtree materialized by `try_extract`.
    fn unextract(&self, node: &NodeHandle);

    /// The declared archive type of a node, or `None` when the node does not
    /// resolve to an archive (a claim without a payload degrades to an
    /// ordinary node).
    fn declared_kind(&self, node: &NodeHandle) -> Option<ArchiveKind> {
        node.value().as_archive().map(|r| r.kind.clone())
    }

    /// `true` if the node references a sub-directory continuation rather
    /// than a distinct logical archive.
    fn is_sub_directory(&self, node: &NodeHandle) -> bool {
        matches!(node.value(), Value::Archive(r) if r.sub_directory)
    }
}

/// Provider over fully materialized in-memory trees.
///
/// Intended for tests and embedding: every subtree is already present, so
/// extraction always succeeds and release is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryProvider;

impl MemoryProvider {
    pub fn new() -> Self {
        Self
    }
}

impl NodeProvider for MemoryProvider {
    fn try_extract(&self, _node: &NodeHandle) -> bool {
        true
    }

    fn unextract(&self, _node: &NodeHandle) {}
}
