//! Uniform view over real and virtual trees.
//!
//! The differ walks [`TreeRef`]s so that a regrouped virtual overlay and a
//! plain node tree compare through the same code path. A virtual node whose
//! overlay children were never populated falls through to its underlying
//! real node, so lazily extracted subtrees below the overlay remain
//! reachable.

use pak_node::{NodeHandle, Value};
use pak_overlay::VirtualNode;

/// A node in either a real or a virtual tree.
#[derive(Clone, Debug)]
pub enum TreeRef<'a> {
    Real(NodeHandle),
    Virtual(&'a VirtualNode),
}

impl<'a> TreeRef<'a> {
    /// View a real node tree.
    pub fn real(node: &NodeHandle) -> Self {
        Self::Real(node.clone())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Real(node) => node.name(),
            Self::Virtual(v) => v.name(),
        }
    }

    /// The compared payload. `None` only for a synthetic virtual node that
    /// never received a link (treated as a composite marker by the differ).
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Real(node) => Some(node.value()),
            Self::Virtual(v) => v.value(),
        }
    }

    /// The real node behind this reference: the node itself, or a virtual
    /// node's last-combined source. Extraction targets this handle.
    pub fn handle(&self) -> Option<NodeHandle> {
        match self {
            Self::Real(node) => Some(node.clone()),
            Self::Virtual(v) => v.link_nodes().last().cloned(),
        }
    }

    /// Children in insertion order.
    ///
    /// A virtual node with no overlay children delegates to its underlying
    /// real node's children.
    pub fn children(&self) -> Vec<TreeRef<'a>> {
        match self {
            Self::Real(node) => node.children().into_iter().map(Self::Real).collect(),
            Self::Virtual(v) => {
                if v.children().is_empty() {
                    match v.link_nodes().last() {
                        Some(link) => {
                            link.children().into_iter().map(Self::Real).collect()
                        }
                        None => Vec::new(),
                    }
                } else {
                    v.children().iter().map(Self::Virtual).collect()
                }
            }
        }
    }

    /// Look up a direct child by name, with the same fall-through rule as
    /// [`children`](Self::children).
    pub fn child(&self, name: &str) -> Option<TreeRef<'a>> {
        match self {
            Self::Real(node) => node.child(name).map(Self::Real),
            Self::Virtual(v) => {
                if v.children().is_empty() {
                    v.link_nodes()
                        .last()
                        .and_then(|link| link.child(name))
                        .map(Self::Real)
                } else {
                    v.child(name).map(Self::Virtual)
                }
            }
        }
    }
}
