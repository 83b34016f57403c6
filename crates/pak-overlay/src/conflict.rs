use std::fmt;

use serde::{Deserialize, Serialize};

/// A name collision `combine` could not merge cleanly: both sides were leaf
/// values of incompatible kinds.
///
/// The tree shape never loses children (`combine` always recurses, never
/// overwrites); at the value level the last-combined source wins. Conflicts
/// are reported so the caller can surface them instead of discovering a
/// silently picked side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConflict {
    /// Path of the colliding node within the combined tree.
    pub path: String,
    /// Payload kind already present at the path.
    pub existing: String,
    /// Payload kind of the colliding source.
    pub incoming: String,
}

impl fmt::Display for GroupingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grouping conflict at {}: {} vs {}",
            self.path, self.existing, self.incoming
        )
    }
}
