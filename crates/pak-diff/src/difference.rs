use pak_node::{NodeHandle, Value};
use serde::{Deserialize, Serialize};

/// Classification of one node pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceKind {
    /// Present in both trees, equal under the leaf equality policy.
    Unchanged,
    /// Present in both trees with differing payloads.
    Changed,
    /// Present only in the new tree.
    Added,
    /// Present only in the old tree.
    Removed,
}

/// One record of the difference set.
///
/// `path` is the stable `/`-joined key of the node (the new side's path when
/// present, otherwise the old side's). Node handles and payload snapshots are
/// absent on the side where the node does not exist.
#[derive(Clone, Debug)]
pub struct CompareDifference {
    pub kind: DifferenceKind,
    pub path: String,
    /// Underlying real node on the new side (a virtual node reports its
    /// last-combined source).
    pub node_new: Option<NodeHandle>,
    pub node_old: Option<NodeHandle>,
    /// Payload extracted at comparison time.
    pub value_new: Option<Value>,
    pub value_old: Option<Value>,
}

impl CompareDifference {
    /// `true` for everything but `Unchanged`.
    pub fn is_difference(&self) -> bool {
        self.kind != DifferenceKind::Unchanged
    }
}
