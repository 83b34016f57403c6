//! The virtual node overlay.
//!
//! A [`VirtualNode`] represents either a single physical node or a synthetic
//! grouping of several physical trees merged under one logical name. Trees
//! are merged incrementally through [`VirtualNode::combine`], which recurses
//! on name collisions instead of overwriting -- no grandchild is ever lost,
//! whichever order the sources arrive in.

use pak_node::{NodeHandle, Value, ValueClass};
use tracing::warn;

use crate::conflict::GroupingConflict;

/// A lightweight tree node over one or more underlying real nodes.
///
/// `link_nodes` is never empty once a node is finalized: a wrapped node has
/// exactly one link, a combined group has one per merged source. The first
/// link is the representative physical source; the last one supplies the
/// compared value (last-combined wins on leaf collisions).
#[derive(Clone, Debug)]
pub struct VirtualNode {
    name: String,
    link_nodes: Vec<NodeHandle>,
    children: Vec<VirtualNode>,
}

impl VirtualNode {
    /// Wrap a single node. Children are NOT populated; callers add them
    /// explicitly via [`add_child`](Self::add_child) or merge whole trees
    /// with [`combine`](Self::combine).
    pub fn wrap(node: &NodeHandle) -> Self {
        Self {
            name: node.name().to_string(),
            link_nodes: vec![node.clone()],
            children: Vec::new(),
        }
    }

    /// Create an empty synthetic node. Links accumulate as sources are
    /// combined in.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link_nodes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying real nodes this virtual node stands for.
    pub fn link_nodes(&self) -> &[NodeHandle] {
        &self.link_nodes
    }

    /// The representative physical source (the first combined link).
    pub fn representative(&self) -> Option<&NodeHandle> {
        self.link_nodes.first()
    }

    /// The value this node compares as: the last combined link's payload.
    pub fn value(&self) -> Option<&Value> {
        self.link_nodes.last().map(|n| n.value())
    }

    pub fn children(&self) -> &[VirtualNode] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&VirtualNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Add a real node as a child.
    ///
    /// With `as_is` the node's entire subtree is preserved verbatim; without
    /// it only the node itself is wrapped and the caller regroups further.
    pub fn add_child(&mut self, node: &NodeHandle, as_is: bool) {
        if as_is {
            self.children.push(Self::wrap_deep(node));
        } else {
            self.children.push(Self::wrap(node));
        }
    }

    /// Attach an already-built virtual child (synthetic group nodes).
    pub fn push_child(&mut self, child: VirtualNode) {
        self.children.push(child);
    }

    /// Merge `node`'s entire subtree into this virtual node.
    ///
    /// Safe to call repeatedly with sources of the same declared type: a
    /// same-named child is combined recursively, a new name is deep-wrapped.
    /// Returns the leaf-level collisions that could not merge cleanly (see
    /// [`GroupingConflict`]); these never abort the merge.
    pub fn combine(&mut self, node: &NodeHandle) -> Vec<GroupingConflict> {
        let mut conflicts = Vec::new();
        let path = self.name.clone();
        self.combine_at(node, &path, &mut conflicts);
        conflicts
    }

    fn combine_at(
        &mut self,
        node: &NodeHandle,
        path: &str,
        conflicts: &mut Vec<GroupingConflict>,
    ) {
        self.link_nodes.push(node.clone());
        for child in node.children() {
            let child_path = format!("{path}/{}", child.name());
            match self.children.iter().position(|c| c.name == child.name()) {
                Some(i) => {
                    let existing = &mut self.children[i];
                    if let Some(conflict) =
                        leaf_collision(existing, &child, &child_path)
                    {
                        warn!(%conflict, "ambiguous grouping, last-combined value wins");
                        conflicts.push(conflict);
                    }
                    existing.combine_at(&child, &child_path, conflicts);
                }
                None => self.children.push(Self::wrap_deep(&child)),
            }
        }
    }

    /// Wrap a node together with its entire subtree, unmodified.
    fn wrap_deep(node: &NodeHandle) -> Self {
        let mut wrapped = Self::wrap(node);
        for child in node.children() {
            wrapped.children.push(Self::wrap_deep(&child));
        }
        wrapped
    }
}

/// A collision is ambiguous when both sides are leaves of incompatible
/// payload kinds. Composite-vs-anything and matching kinds merge fine.
fn leaf_collision(
    existing: &VirtualNode,
    incoming: &NodeHandle,
    path: &str,
) -> Option<GroupingConflict> {
    let existing_value = existing.value()?;
    let existing_leaf = existing.children.is_empty() && is_leaf_class(existing_value);
    let incoming_leaf = !incoming.has_children() && is_leaf_class(incoming.value());
    if existing_leaf && incoming_leaf && existing_value.class() != incoming.value().class() {
        Some(GroupingConflict {
            path: path.to_string(),
            existing: format!("{:?}", existing_value.class()),
            incoming: format!("{:?}", incoming.value().class()),
        })
    } else {
        None
    }
}

fn is_leaf_class(value: &Value) -> bool {
    !matches!(value.class(), ValueClass::SubTree | ValueClass::Archive)
}
