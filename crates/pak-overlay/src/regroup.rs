//! The archive regrouper.
//!
//! A base aggregate's direct children are whole sub-archives of varying
//! declared types, often several physical files per type. [`rebuild`] walks
//! the root once, carries plain children over as-is, and folds each per-type
//! partition of sub-archives through [`VirtualNode::combine`] into one
//! synthetic group child. [`split_by_type`] then exposes one comparable tree
//! per declared type.
//!
//! Both operations are pure over immutable inputs and can run repeatedly.

use std::collections::BTreeMap;

use pak_node::{ArchiveKind, NodeHandle, NodeProvider, NoopObserver, ProgressObserver};
use tracing::{debug, warn};

use crate::conflict::GroupingConflict;
use crate::virtual_node::VirtualNode;

/// Output of [`rebuild`]: the virtual root plus any grouping conflicts met
/// while merging same-type sub-archives.
#[derive(Clone, Debug)]
pub struct Rebuilt {
    pub root: VirtualNode,
    pub conflicts: Vec<GroupingConflict>,
}

/// Regroup an archive root into a single logical virtual tree.
pub fn rebuild(root: &NodeHandle, provider: &dyn NodeProvider) -> Rebuilt {
    rebuild_with_observer(root, provider, &NoopObserver)
}

/// [`rebuild`] with progress reporting: one phase per type group, one
/// completed unit per attached group.
pub fn rebuild_with_observer(
    root: &NodeHandle,
    provider: &dyn NodeProvider,
    observer: &dyn ProgressObserver,
) -> Rebuilt {
    let mut top = VirtualNode::wrap(root);
    let mut sub_archives: Vec<NodeHandle> = Vec::new();

    for child in root.children() {
        match provider.declared_kind(&child) {
            // A nested non-subdirectory archive is regrouped below. A child
            // that claims to be an archive but does not resolve to one
            // (declared_kind = None) degrades to an ordinary child.
            Some(_) if !provider.is_sub_directory(&child) => sub_archives.push(child),
            _ => top.add_child(&child, true),
        }
    }

    let mut conflicts = Vec::new();
    if provider.declared_kind(root) == Some(ArchiveKind::Base) {
        let groups = partition_by_kind(&sub_archives, provider);
        let total = groups.len();
        for (done, (kind, members)) in groups.into_iter().enumerate() {
            observer.phase_changed(&format!("regrouping {kind}"));
            let mut group = VirtualNode::named(kind.tag());
            for member in members {
                let extracted = provider.try_extract(&member);
                if !extracted {
                    warn!(
                        name = member.name(),
                        kind = %kind,
                        "extraction failed, sub-archive merged empty"
                    );
                }
                conflicts.extend(group.combine(&member));
                // The combined overlay owns handles to the member's subtree,
                // so the extraction can be released right away.
                if extracted {
                    provider.unextract(&member);
                }
            }
            top.push_child(group);
            observer.unit_completed(done + 1, total);
        }
    }

    debug!(
        children = top.children().len(),
        conflicts = conflicts.len(),
        "rebuilt virtual tree"
    );
    Rebuilt {
        root: top,
        conflicts,
    }
}

/// Split a rebuilt virtual tree into one entry per declared type.
///
/// The root is keyed under its own declared kind. For a base root, every
/// synthetic group child contributes an entry keyed by the kind of its
/// representative source. A non-base root yields a single entry.
pub fn split_by_type(root: &VirtualNode) -> BTreeMap<ArchiveKind, &VirtualNode> {
    let mut map = BTreeMap::new();

    let root_kind = declared_kind_of(root)
        .unwrap_or_else(|| ArchiveKind::named(root.name()));
    let is_base = root_kind.is_base();
    map.insert(root_kind, root);

    if is_base {
        for child in root.children() {
            if let Some(kind) = declared_kind_of(child) {
                map.insert(kind, child);
            }
        }
    }

    map
}

fn declared_kind_of(node: &VirtualNode) -> Option<ArchiveKind> {
    node.representative()
        .and_then(|n| n.value().as_archive())
        .map(|r| r.kind.clone())
}

/// Stable partition by declared kind, ordered by first occurrence.
fn partition_by_kind(
    nodes: &[NodeHandle],
    provider: &dyn NodeProvider,
) -> Vec<(ArchiveKind, Vec<NodeHandle>)> {
    let mut groups: Vec<(ArchiveKind, Vec<NodeHandle>)> = Vec::new();
    for node in nodes {
        let Some(kind) = provider.declared_kind(node) else {
            continue;
        };
        match groups.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, members)) => members.push(node.clone()),
            None => groups.push((kind, vec![node.clone()])),
        }
    }
    groups
}
