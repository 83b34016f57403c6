//! Tree nodes.
//!
//! Nodes are shared immutably via [`NodeHandle`] (`Arc<Node>`). The child
//! list sits behind a `RwLock` so a provider can materialize lazily-loaded
//! children without exclusive access to the whole tree; everything else on a
//! node is fixed at construction.

use std::sync::{Arc, RwLock};

use crate::error::{NodeError, NodeResult};
use crate::value::Value;

/// Shared handle to a tree node.
pub type NodeHandle = Arc<Node>;

/// A named tree node with a typed payload and insertion-ordered children.
///
/// Child names are unique among siblings; insertion order is preserved and
/// drives report ordering downstream.
#[derive(Debug)]
pub struct Node {
    name: String,
    value: Value,
    children: RwLock<Vec<NodeHandle>>,
}

impl Node {
    /// Create a node with an explicit payload.
    pub fn new(name: impl Into<String>, value: Value) -> NodeHandle {
        Arc::new(Self {
            name: name.into(),
            value,
            children: RwLock::new(Vec::new()),
        })
    }

    /// Create a composite node (payload [`Value::SubTree`]).
    pub fn branch(name: impl Into<String>) -> NodeHandle {
        Self::new(name, Value::SubTree)
    }

    /// Create a payload-bearing leaf node.
    pub fn leaf(name: impl Into<String>, value: Value) -> NodeHandle {
        Self::new(name, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Append a child, rejecting duplicate sibling names.
    pub fn append(&self, child: NodeHandle) -> NodeResult<()> {
        let mut children = self.children.write().expect("lock poisoned");
        if children.iter().any(|c| c.name == child.name) {
            return Err(NodeError::DuplicateChild {
                parent: self.name.clone(),
                name: child.name.clone(),
            });
        }
        children.push(child);
        Ok(())
    }

    /// Snapshot of the child list in insertion order.
    ///
    /// Handles are cheap clones; the underlying nodes are shared.
    pub fn children(&self) -> Vec<NodeHandle> {
        self.children.read().expect("lock poisoned").clone()
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<NodeHandle> {
        self.children
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }

    pub fn has_children(&self) -> bool {
        !self.children.read().expect("lock poisoned").is_empty()
    }

    /// Drop all children. Providers use this to release a materialized
    /// subtree.
    pub fn clear_children(&self) {
        self.children.write().expect("lock poisoned").clear();
    }

    /// Resolve a `/`-separated path of child names from this node.
    pub fn get(&self, path: &str) -> Option<NodeHandle> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.child(first)?;
        for segment in segments {
            let next = current.child(segment)?;
            current = next;
        }
        Some(current)
    }
}
