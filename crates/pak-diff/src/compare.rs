//! The recursive tree walk.
//!
//! Children are aligned strictly by name; there is no rename detection.
//! Emission order per parent: every name present in the new tree first, in
//! the new tree's child order, then names present only in the old tree, in
//! the old tree's child order -- added and changed items surface before pure
//! removals.
//!
//! Nothing in a walk is fatal: an extraction failure narrows what is
//! reported for one subtree and is logged, the rest of the run continues.

use pak_node::{
    NodeHandle, NodeProvider, NoopObserver, ProgressObserver, Value, ValueClass,
};
use tracing::{debug, warn};

use crate::config::CompareConfig;
use crate::difference::{CompareDifference, DifferenceKind};
use crate::policy;
use crate::tree_ref::TreeRef;

/// Upper bound on link-resolution hops; a longer chain is treated as cyclic
/// and degrades to raw string comparison.
const MAX_LINK_HOPS: usize = 16;

/// Stand-in payload for synthetic virtual nodes that carry none.
static SUBTREE: Value = Value::SubTree;

static NOOP: NoopObserver = NoopObserver;

/// The comparison entry point.
///
/// A `Comparer` holds no per-run state; one instance may serve any number of
/// sequential comparisons. The observer is invoked synchronously and never
/// concurrently within a run.
pub struct Comparer<'a> {
    config: CompareConfig,
    observer: &'a dyn ProgressObserver,
}

impl<'a> Comparer<'a> {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            observer: &NOOP,
        }
    }

    /// Attach a progress observer for subsequent runs.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Compare two trees and return one record per classified node.
    ///
    /// The roots themselves are not classified; alignment starts at their
    /// children, and paths in the records are root-relative. `Unchanged`
    /// records are always computed and emitted -- callers filter with
    /// [`CompareDifference::is_difference`] when they only want differences.
    pub fn compare<'t>(
        &self,
        new: &TreeRef<'t>,
        old: &TreeRef<'t>,
        provider: &dyn NodeProvider,
    ) -> Vec<CompareDifference> {
        debug!(new = new.name(), old = old.name(), "comparing trees");
        let mut walk = Walk {
            config: &self.config,
            observer: self.observer,
            provider,
            new_root: new.clone(),
            old_root: old.clone(),
            out: Vec::new(),
        };

        let (new_kids, new_guard) = walk.open_children(new, new.name());
        let (old_kids, old_guard) = walk.open_children(old, old.name());
        if let (Some(new_kids), Some(old_kids)) = (new_kids, old_kids) {
            walk.compare_child_sets(&new_kids, &old_kids, "");
        }
        walk.release(new_guard);
        walk.release(old_guard);

        debug!(records = walk.out.len(), "comparison finished");
        walk.out
    }
}

struct Walk<'w, 't> {
    config: &'w CompareConfig,
    observer: &'w dyn ProgressObserver,
    provider: &'w dyn NodeProvider,
    new_root: TreeRef<'t>,
    old_root: TreeRef<'t>,
    out: Vec<CompareDifference>,
}

impl<'w, 't> Walk<'w, 't> {
    /// Align two child sets by name and classify every member.
    /// Returns `true` if anything in either set differs.
    fn compare_child_sets(
        &mut self,
        new_kids: &[TreeRef<'t>],
        old_kids: &[TreeRef<'t>],
        path: &str,
    ) -> bool {
        let mut changed = false;

        for child in new_kids {
            let child_path = join(path, child.name());
            match old_kids.iter().find(|c| c.name() == child.name()) {
                Some(old_child) => {
                    changed |= self.compare_pair(child, old_child, &child_path);
                }
                None => {
                    self.emit(DifferenceKind::Added, &child_path, Some(child), None);
                    changed = true;
                }
            }
        }

        for child in old_kids {
            if !new_kids.iter().any(|c| c.name() == child.name()) {
                let child_path = join(path, child.name());
                self.emit(DifferenceKind::Removed, &child_path, None, Some(child));
                changed = true;
            }
        }

        changed
    }

    /// Classify one aligned pair. Returns `true` if the pair or anything
    /// below it differs.
    fn compare_pair(&mut self, new: &TreeRef<'t>, old: &TreeRef<'t>, path: &str) -> bool {
        let vn = new.value().unwrap_or(&SUBTREE);
        let vo = old.value().unwrap_or(&SUBTREE);
        let (cn, co) = (vn.class(), vo.class());

        // Archive boundaries are atomic leaf units unless the walk was told
        // to pass through them: compared by declared metadata, not traversed.
        if !self.config.ignore_archive_boundaries
            && (cn == ValueClass::Archive || co == ValueClass::Archive)
        {
            let equal = policy::values_equal(self.config, vn, vo);
            return self.emit_leaf(equal, path, new, old);
        }

        // Payload kinds differ: a change, with no meaningful recursion.
        if cn != co {
            self.emit(DifferenceKind::Changed, path, Some(new), Some(old));
            return true;
        }

        match cn {
            ValueClass::SubTree | ValueClass::Archive => {
                self.compare_composite(new, old, false, path)
            }
            // An image carries both a comparable payload and a potential
            // subtree of its own.
            ValueClass::Image => {
                let own_changed = !self.leaf_equal(vn, vo, path);
                self.compare_composite(new, old, own_changed, path)
            }
            _ => {
                let equal = self.leaf_equal(vn, vo, path);
                self.emit_leaf(equal, path, new, old)
            }
        }
    }

    /// Recurse into a composite pair and emit the node-level record the
    /// configuration calls for.
    fn compare_composite(
        &mut self,
        new: &TreeRef<'t>,
        old: &TreeRef<'t>,
        own_changed: bool,
        path: &str,
    ) -> bool {
        let (new_kids, new_guard) = self.open_children(new, path);
        let (old_kids, old_guard) = self.open_children(old, path);

        let sub_changed = match (new_kids, old_kids) {
            (Some(new_kids), Some(old_kids)) => {
                self.compare_child_sets(&new_kids, &old_kids, path)
            }
            // Extraction failed on a side: the subtree is unavailable and
            // contributes no children-level records.
            _ => false,
        };

        self.release(new_guard);
        self.release(old_guard);

        let changed = own_changed || sub_changed;
        if own_changed || (changed && self.config.report_composite) {
            self.emit(DifferenceKind::Changed, path, Some(new), Some(old));
        } else if !changed {
            self.emit(DifferenceKind::Unchanged, path, Some(new), Some(old));
        }
        changed
    }

    /// Children of a node, materializing the lazily-loaded subtree first
    /// when the payload calls for it.
    ///
    /// `None` children mean extraction failed. The returned handle, if any,
    /// is an extraction to release with [`release`](Self::release) once the
    /// subtree is done.
    fn open_children(
        &mut self,
        tree: &TreeRef<'t>,
        path: &str,
    ) -> (Option<Vec<TreeRef<'t>>>, Option<NodeHandle>) {
        let lazily_loaded = matches!(
            tree.value().map(Value::class),
            Some(ValueClass::Image | ValueClass::Archive)
        );
        if !lazily_loaded {
            return (Some(tree.children()), None);
        }
        let Some(handle) = tree.handle() else {
            return (Some(tree.children()), None);
        };

        self.observer.phase_changed(&format!("extracting {path}"));
        if self.provider.try_extract(&handle) {
            (Some(tree.children()), Some(handle))
        } else {
            warn!(path, node = handle.name(), "extraction failed, subtree unavailable");
            (None, None)
        }
    }

    fn release(&mut self, guard: Option<NodeHandle>) {
        if let Some(handle) = guard {
            self.provider.unextract(&handle);
        }
    }

    /// Leaf payload equality, resolving link targets first when configured.
    fn leaf_equal(&self, vn: &Value, vo: &Value, path: &str) -> bool {
        if self.config.resolve_links {
            if let (Value::Link(target_new), Value::Link(target_old)) = (vn, vo) {
                let resolved_new = resolve_link(&self.new_root, path, target_new);
                let resolved_old = resolve_link(&self.old_root, path, target_old);
                if let (Some(resolved_new), Some(resolved_old)) = (resolved_new, resolved_old) {
                    return policy::values_equal(self.config, &resolved_new, &resolved_old);
                }
                // Unresolvable or cyclic on a side: degrade to raw strings.
            }
        }
        policy::values_equal(self.config, vn, vo)
    }

    fn emit_leaf(&mut self, equal: bool, path: &str, new: &TreeRef<'t>, old: &TreeRef<'t>) -> bool {
        let kind = if equal {
            DifferenceKind::Unchanged
        } else {
            DifferenceKind::Changed
        };
        self.emit(kind, path, Some(new), Some(old));
        !equal
    }

    fn emit(
        &mut self,
        kind: DifferenceKind,
        path: &str,
        new: Option<&TreeRef<'t>>,
        old: Option<&TreeRef<'t>>,
    ) {
        self.out.push(CompareDifference {
            kind,
            path: path.to_string(),
            node_new: new.and_then(TreeRef::handle),
            node_old: old.and_then(TreeRef::handle),
            value_new: new.and_then(|t| t.value().cloned()),
            value_old: old.and_then(|t| t.value().cloned()),
        });
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}/{name}")
    }
}

/// Follow a link target to its final value.
///
/// Targets are relative to the link node's parent; `..` steps up one level.
/// Chains longer than [`MAX_LINK_HOPS`] are treated as cyclic. `None` means
/// the chain could not be resolved.
fn resolve_link(root: &TreeRef<'_>, link_path: &str, target: &str) -> Option<Value> {
    let mut dir: Vec<String> = link_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    dir.pop()?;

    let mut target = target.to_string();
    for _ in 0..MAX_LINK_HOPS {
        let mut segments = dir.clone();
        for seg in target.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                name => segments.push(name.to_string()),
            }
        }

        let mut node = root.clone();
        for seg in &segments {
            node = node.child(seg)?;
        }

        match node.value() {
            Some(Value::Link(next)) => {
                target = next.clone();
                dir = segments;
                dir.pop();
            }
            Some(value) => return Some(value.clone()),
            None => return Some(Value::SubTree),
        }
    }
    None
}
