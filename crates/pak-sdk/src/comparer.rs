//! Whole-archive comparison.
//!
//! The facade inspects the declared kind of both roots. If either side is a
//! base aggregate, both sides are regrouped into virtual per-type trees and
//! every type present on both sides is compared with archive boundaries
//! dissolved. Otherwise the two trees are compared directly under the
//! caller's configuration.

use std::collections::BTreeMap;

use pak_diff::{CompareConfig, CompareDifference, Comparer, DifferenceKind, TreeRef};
use pak_node::{ArchiveKind, NodeHandle, NodeProvider, NoopObserver, ProgressObserver};
use pak_overlay::{rebuild_with_observer, split_by_type, GroupingConflict, VirtualNode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

static NOOP: NoopObserver = NoopObserver;

/// Count of records per classification for one compared type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub changed: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    /// Tally a record set.
    pub fn tally(records: &[CompareDifference]) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.kind {
                DifferenceKind::Unchanged => summary.unchanged += 1,
                DifferenceKind::Changed => summary.changed += 1,
                DifferenceKind::Added => summary.added += 1,
                DifferenceKind::Removed => summary.removed += 1,
            }
        }
        summary
    }

    /// Everything but `unchanged`.
    pub fn total_differences(&self) -> usize {
        self.changed + self.added + self.removed
    }

    fn merge(&mut self, other: &Self) {
        self.unchanged += other.unchanged;
        self.changed += other.changed;
        self.added += other.added;
        self.removed += other.removed;
    }
}

/// The outcome for one declared type: the differences found, plus counts
/// over the full record set (unchanged nodes included).
#[derive(Clone, Debug, Default)]
pub struct TypeReport {
    pub differences: Vec<CompareDifference>,
    pub summary: DiffSummary,
}

impl TypeReport {
    fn from_records(records: Vec<CompareDifference>) -> Self {
        let summary = DiffSummary::tally(&records);
        let differences = records.into_iter().filter(|r| r.is_difference()).collect();
        Self {
            differences,
            summary,
        }
    }
}

/// Outcome of a whole-archive comparison: one report per compared type,
/// plus any grouping conflicts met while building the virtual overlays.
#[derive(Debug, Default)]
pub struct ComparisonReport {
    pub reports: BTreeMap<ArchiveKind, TypeReport>,
    pub conflicts: Vec<GroupingConflict>,
}

impl ComparisonReport {
    /// Aggregate counts over every compared type.
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for report in self.reports.values() {
            summary.merge(&report.summary);
        }
        summary
    }
}

/// Entry point for whole-archive comparisons.
pub struct ArchiveComparer<'a> {
    config: CompareConfig,
    observer: &'a dyn ProgressObserver,
}

impl<'a> ArchiveComparer<'a> {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            observer: &NOOP,
        }
    }

    /// Attach a progress observer. It sees the regrouping phases first,
    /// then one phase and one completed unit per compared type.
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Compare two archive roots, new side first.
    pub fn compare(
        &self,
        new_root: &NodeHandle,
        old_root: &NodeHandle,
        provider: &dyn NodeProvider,
    ) -> ComparisonReport {
        let base_involved = [new_root, old_root].into_iter().any(|root| {
            provider
                .declared_kind(root)
                .is_some_and(|kind| kind.is_base())
        });

        let report = if base_involved {
            self.compare_regrouped(new_root, old_root, provider)
        } else {
            self.compare_direct(new_root, old_root, provider)
        };

        let summary = report.summary();
        info!(
            types = report.reports.len(),
            changed = summary.changed,
            added = summary.added,
            removed = summary.removed,
            conflicts = report.conflicts.len(),
            "archive comparison finished"
        );
        report
    }

    /// One direct comparison, keyed by the new root's declared kind.
    fn compare_direct(
        &self,
        new_root: &NodeHandle,
        old_root: &NodeHandle,
        provider: &dyn NodeProvider,
    ) -> ComparisonReport {
        let kind = provider
            .declared_kind(new_root)
            .unwrap_or_else(|| ArchiveKind::named(new_root.name()));

        self.observer.phase_changed(&format!("comparing {kind}"));
        let records = Comparer::new(self.config.clone())
            .with_observer(self.observer)
            .compare(
                &TreeRef::real(new_root),
                &TreeRef::real(old_root),
                provider,
            );
        self.observer.unit_completed(1, 1);

        let mut reports = BTreeMap::new();
        reports.insert(kind, TypeReport::from_records(records));
        ComparisonReport {
            reports,
            conflicts: Vec::new(),
        }
    }

    /// Regroup both sides and compare each type present on both.
    ///
    /// The base entry is not compared whole, since the per-type groups it
    /// holds get their own reports; its remaining plain children (carried
    /// over as-is by the regrouper) are compared under the base key so
    /// their differences do not vanish.
    fn compare_regrouped(
        &self,
        new_root: &NodeHandle,
        old_root: &NodeHandle,
        provider: &dyn NodeProvider,
    ) -> ComparisonReport {
        let new_rebuilt = rebuild_with_observer(new_root, provider, self.observer);
        let old_rebuilt = rebuild_with_observer(old_root, provider, self.observer);
        let new_split = split_by_type(&new_rebuilt.root);
        let old_split = split_by_type(&old_rebuilt.root);

        let comparer = Comparer::new(self.config.virtual_trees()).with_observer(self.observer);

        let common: Vec<&ArchiveKind> = new_split
            .keys()
            .filter(|kind| !kind.is_base() && old_split.contains_key(*kind))
            .collect();
        let both_base = new_split.contains_key(&ArchiveKind::Base)
            && old_split.contains_key(&ArchiveKind::Base);
        let total = common.len() + usize::from(both_base);
        let mut done = 0;

        let mut reports = BTreeMap::new();
        if both_base {
            let new_plain = plain_children(&new_rebuilt.root, &new_split);
            let old_plain = plain_children(&old_rebuilt.root, &old_split);
            self.observer
                .phase_changed(&format!("comparing {}", ArchiveKind::Base));
            let records = comparer.compare(
                &TreeRef::Virtual(&new_plain),
                &TreeRef::Virtual(&old_plain),
                provider,
            );
            debug!(kind = %ArchiveKind::Base, records = records.len(), "type compared");
            reports.insert(ArchiveKind::Base, TypeReport::from_records(records));
            done += 1;
            self.observer.unit_completed(done, total);
        }

        for kind in common {
            self.observer.phase_changed(&format!("comparing {kind}"));
            let records = comparer.compare(
                &TreeRef::Virtual(new_split[kind]),
                &TreeRef::Virtual(old_split[kind]),
                provider,
            );
            debug!(%kind, records = records.len(), "type compared");
            reports.insert(kind.clone(), TypeReport::from_records(records));
            done += 1;
            self.observer.unit_completed(done, total);
        }

        let mut conflicts = new_rebuilt.conflicts;
        conflicts.extend(old_rebuilt.conflicts);
        ComparisonReport { reports, conflicts }
    }
}

/// A synthetic root holding only the children that were carried over as-is,
/// with every split entry (the root itself included) left out.
fn plain_children(
    root: &VirtualNode,
    split: &BTreeMap<ArchiveKind, &VirtualNode>,
) -> VirtualNode {
    let mut plain = VirtualNode::named(root.name());
    for child in root.children() {
        if !split.values().any(|entry| std::ptr::eq(*entry, child)) {
            plain.push_child(child.clone());
        }
    }
    plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use pak_node::{ArchiveRef, MemoryProvider, Node, Value};

    fn archive(name: &str, kind: ArchiveKind) -> NodeHandle {
        Node::new(name, Value::Archive(ArchiveRef::new(kind)))
    }

    /// Base aggregate with a split "String" type and a single "Item" type.
    fn base_root(dmg: i64, with_extra: bool) -> NodeHandle {
        let root = archive("Base", ArchiveKind::Base);

        let s1 = archive("String", ArchiveKind::named("String"));
        s1.append(Node::leaf("eqp", Value::Text("Sword".into())))
            .unwrap();
        let s2 = archive("String2", ArchiveKind::named("String"));
        s2.append(Node::leaf("etc", Value::Text("Ore".into())))
            .unwrap();

        let item = archive("Item", ArchiveKind::named("Item"));
        item.append(Node::leaf("dmg", Value::Int(dmg))).unwrap();
        if with_extra {
            item.append(Node::leaf("new_item", Value::Int(1))).unwrap();
        }

        root.append(s1).unwrap();
        root.append(s2).unwrap();
        root.append(item).unwrap();
        root
    }

    #[test]
    fn base_roots_compare_per_regrouped_type() {
        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &base_root(10, false),
            &base_root(10, false),
            &MemoryProvider,
        );

        // One report per type present on both sides, plus the base entry
        // covering the root's plain children.
        assert_eq!(report.reports.len(), 3);
        assert!(report.reports.contains_key(&ArchiveKind::Base));
        assert!(report.reports.contains_key(&ArchiveKind::named("String")));
        assert!(report.reports.contains_key(&ArchiveKind::named("Item")));
        assert!(report.conflicts.is_empty());
        assert_eq!(report.summary().total_differences(), 0);
        assert!(report.summary().unchanged > 0);
    }

    #[test]
    fn differences_land_in_the_owning_type_report() {
        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &base_root(12, true),
            &base_root(10, false),
            &MemoryProvider,
        );

        let item = &report.reports[&ArchiveKind::named("Item")];
        assert_eq!(item.summary.changed, 1);
        assert_eq!(item.summary.added, 1);
        let paths: Vec<_> = item.differences.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["dmg", "new_item"]);

        let string = &report.reports[&ArchiveKind::named("String")];
        assert_eq!(string.summary.total_differences(), 0);
    }

    #[test]
    fn non_base_roots_compare_directly() {
        let build = |dmg: i64| {
            let root = archive("Item", ArchiveKind::named("Item"));
            root.append(Node::leaf("dmg", Value::Int(dmg))).unwrap();
            root
        };

        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &build(10),
            &build(12),
            &MemoryProvider,
        );

        assert_eq!(report.reports.len(), 1);
        let item = &report.reports[&ArchiveKind::named("Item")];
        assert_eq!(item.summary.changed, 1);
        assert_eq!(item.differences[0].path, "dmg");
    }

    #[test]
    fn type_present_on_one_side_only_is_skipped() {
        let lonely = archive("Base", ArchiveKind::Base);
        let quest = archive("Quest", ArchiveKind::named("Quest"));
        quest.append(Node::leaf("q", Value::Int(1))).unwrap();
        lonely.append(quest).unwrap();

        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &lonely,
            &base_root(10, false),
            &MemoryProvider,
        );
        // Only the base entry remains, and neither side has plain children.
        assert_eq!(report.reports.len(), 1);
        assert!(!report.reports.contains_key(&ArchiveKind::named("Quest")));
        assert!(!report.reports.contains_key(&ArchiveKind::named("String")));
        assert_eq!(report.summary(), DiffSummary::default());
    }

    #[test]
    fn base_root_plain_child_changes_are_reported() {
        let build = |version: i64| {
            let root = archive("Base", ArchiveKind::Base);
            root.append(Node::leaf("version", Value::Int(version)))
                .unwrap();
            let item = archive("Item", ArchiveKind::named("Item"));
            item.append(Node::leaf("dmg", Value::Int(10))).unwrap();
            root.append(item).unwrap();
            root
        };

        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &build(2),
            &build(1),
            &MemoryProvider,
        );

        let base = &report.reports[&ArchiveKind::Base];
        assert_eq!(base.summary.changed, 1);
        assert_eq!(base.differences[0].path, "version");
        assert_eq!(base.differences[0].value_old, Some(Value::Int(1)));
        // Group children stay out of the base report.
        assert_eq!(base.summary.unchanged, 0);
        assert_eq!(
            report.reports[&ArchiveKind::named("Item")]
                .summary
                .total_differences(),
            0
        );
    }

    #[test]
    fn grouping_conflicts_from_both_sides_are_reported() {
        let conflicted = || {
            let root = archive("Base", ArchiveKind::Base);
            let s1 = archive("String", ArchiveKind::named("String"));
            s1.append(Node::leaf("x", Value::Int(1))).unwrap();
            let s2 = archive("String2", ArchiveKind::named("String"));
            s2.append(Node::leaf("x", Value::Text("one".into()))).unwrap();
            root.append(s1).unwrap();
            root.append(s2).unwrap();
            root
        };

        let report = ArchiveComparer::new(CompareConfig::default()).compare(
            &conflicted(),
            &conflicted(),
            &MemoryProvider,
        );
        assert_eq!(report.conflicts.len(), 2);
        assert!(report.conflicts.iter().all(|c| c.path == "String/x"));
    }

    #[test]
    fn observer_sees_regrouping_then_per_type_comparison() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Recording {
            phases: Mutex<Vec<String>>,
        }
        impl ProgressObserver for Recording {
            fn phase_changed(&self, label: &str) {
                self.phases.lock().unwrap().push(label.to_string());
            }
            fn unit_completed(&self, _done: usize, _total: usize) {}
        }

        let observer = Recording::default();
        ArchiveComparer::new(CompareConfig::default())
            .with_observer(&observer)
            .compare(&base_root(10, false), &base_root(10, false), &MemoryProvider);

        let phases = observer.phases.lock().unwrap();
        let regroup_count = phases.iter().filter(|p| p.starts_with("regrouping")).count();
        let compare_count = phases.iter().filter(|p| p.starts_with("comparing")).count();
        assert_eq!(regroup_count, 4);
        assert_eq!(compare_count, 3);
    }

    #[test]
    fn summary_counts_serialize() {
        let summary = DiffSummary {
            unchanged: 5,
            changed: 2,
            added: 1,
            removed: 0,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: DiffSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
        assert_eq!(back.total_differences(), 3);
    }
}
