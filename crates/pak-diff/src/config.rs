use serde::{Deserialize, Serialize};

/// How strictly image payloads are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageComparison {
    /// Dimensions plus raw encoded byte length.
    SizeOnly,
    /// Dimensions plus decoded pixel buffers. Falls back to byte length
    /// when a side has no decoded buffer available.
    PixelExact,
}

/// Configuration for a comparison run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompareConfig {
    /// When `true`, archive-reference nodes are traversed transparently.
    /// When `false`, they are atomic leaf units compared by declared
    /// metadata only.
    pub ignore_archive_boundaries: bool,
    /// Strictness of image payload comparison.
    pub image_comparison: ImageComparison,
    /// When `true`, link payloads are resolved to their targets before
    /// comparison (bounded hops); otherwise raw link strings are compared.
    pub resolve_links: bool,
    /// When `true`, a composite node whose subtree differs gets its own
    /// `Changed` record. The default lets only leaf differences surface,
    /// a parent's difference being implied by its children's records.
    pub report_composite: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            ignore_archive_boundaries: false,
            image_comparison: ImageComparison::SizeOnly,
            resolve_links: false,
            report_composite: false,
        }
    }
}

impl CompareConfig {
    /// This configuration adjusted for comparing regrouped virtual trees:
    /// the sub-archive boundaries were already dissolved by the overlay, so
    /// the walk must pass through the remaining reference nodes. All other
    /// settings are kept.
    pub fn virtual_trees(&self) -> Self {
        Self {
            ignore_archive_boundaries: true,
            ..self.clone()
        }
    }
}
