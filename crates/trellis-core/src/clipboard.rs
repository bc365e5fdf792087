//! Single-slot clipboard for copied or cut subtrees.
//!
//! A [`Clipboard`] belongs to one editing session. Copying captures the
//! selection plus every descendant as deep clones, so later edits to the
//! source items never show through. Pasting is two steps: validate the
//! target with [`Clipboard::validate_paste`], then build fresh items with
//! [`Clipboard::prepare_for_paste`] and hand them to the store in one batch.

use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    hierarchy,
    models::{ItemId, ItemStatus, ItemType, PlanItem, Predecessor},
    tree::TreeIndex,
};

const COPY_SUFFIX: &str = " (Copy)";

/// Captured subtree, ordered parents before children.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardSnapshot {
    pub items: Vec<PlanItem>,
    pub is_cut: bool,
    pub timestamp: Timestamp,
    pub source_project_id: u64,
}

impl ClipboardSnapshot {
    /// Items whose parent was not captured along with them.
    pub fn roots(&self) -> impl Iterator<Item = &PlanItem> {
        let ids: HashSet<ItemId> = self.items.iter().map(|item| item.id).collect();
        self.items
            .iter()
            .filter(move |item| item.parent_id.map_or(true, |parent| !ids.contains(&parent)))
    }
}

/// Verdict of [`Clipboard::validate_paste`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteValidation {
    pub valid: bool,
    pub error: Option<String>,
}

impl PasteValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Session clipboard holding at most one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    snapshot: Option<ClipboardSnapshot>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures `selected` and all their descendants, replacing any previous
    /// snapshot. Returns the number of items captured. Unknown or orphaned
    /// ids are ignored and an empty capture leaves the clipboard cleared.
    pub fn copy(&mut self, selected: &[ItemId], all_items: &[PlanItem], is_cut: bool) -> usize {
        let tree = TreeIndex::new(all_items);
        let mut captured: HashSet<ItemId> = HashSet::new();
        for &id in selected {
            if tree.contains(id) {
                captured.insert(id);
                captured.extend(tree.descendant_ids(id));
            }
        }

        // Depth-first order keeps parents ahead of their children.
        let items: Vec<PlanItem> = tree
            .depth_first()
            .filter(|item| captured.contains(&item.id))
            .cloned()
            .collect();

        let Some(source_project_id) = items.first().map(|item| item.project_id) else {
            self.snapshot = None;
            return 0;
        };
        let count = items.len();
        log::debug!("Captured {count} items to clipboard (cut: {is_cut})");
        self.snapshot = Some(ClipboardSnapshot {
            items,
            is_cut,
            timestamp: Timestamp::now(),
            source_project_id,
        });
        count
    }

    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn is_cut_operation(&self) -> bool {
        self.snapshot.as_ref().map_or(false, |s| s.is_cut)
    }

    pub fn count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.items.len())
    }

    /// Ids of every captured item, used to delete originals after a cut.
    pub fn source_ids(&self) -> Vec<ItemId> {
        self.snapshot
            .as_ref()
            .map(|s| s.items.iter().map(|item| item.id).collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Option<&ClipboardSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    /// Checks that every root of the copy may sit under `target` (`None`
    /// pastes at root level). Never mutates the snapshot.
    pub fn validate_paste(&self, target: Option<&PlanItem>) -> PasteValidation {
        let Some(snapshot) = &self.snapshot else {
            return PasteValidation::rejected("Nothing to paste.");
        };

        if let Some(target) = target {
            if snapshot.is_cut && snapshot.items.iter().any(|item| item.id == target.id) {
                return PasteValidation::rejected("Cannot paste cut items into themselves.");
            }
        }

        for root in snapshot.roots() {
            match target {
                None => {
                    if !matches!(root.item_type, ItemType::Milestone | ItemType::Component) {
                        return PasteValidation::rejected(
                            "Only milestones and components can be pasted at root level.",
                        );
                    }
                }
                Some(target) => {
                    if root.item_type == ItemType::Component {
                        return PasteValidation::rejected(
                            "Components can only be pasted at root level.",
                        );
                    }
                    if !hierarchy::is_valid_parent(root.item_type, Some(target.item_type)) {
                        return PasteValidation::rejected(format!(
                            "Cannot paste {} under {}.",
                            root.item_type.as_str(),
                            target.item_type.as_str()
                        ));
                    }
                }
            }
        }

        PasteValidation::ok()
    }

    /// Builds fresh items for pasting under `target_parent` in
    /// `target_project_id`, or `None` when the clipboard is empty.
    ///
    /// Every item gets a new id; roots of the copy hang off the target and
    /// descendants off the new id of their copied parent. Sort orders ascend
    /// from `insert_order_start` in parent-before-child order. Progress,
    /// status, WBS number, publishing state, timestamps and estimate links
    /// are reset, and only roots of the copy get the " (Copy)" suffix.
    /// Dependencies between copied items are remapped; dependencies on items
    /// outside the copy are dropped.
    pub fn prepare_for_paste(
        &self,
        target_project_id: u64,
        target_parent: Option<&PlanItem>,
        insert_order_start: i64,
    ) -> Option<Vec<PlanItem>> {
        let snapshot = self.snapshot.as_ref()?;

        let id_map: HashMap<ItemId, ItemId> = snapshot
            .items
            .iter()
            .map(|item| (item.id, Uuid::new_v4()))
            .collect();
        let root_indent = target_parent.map_or(0, |parent| parent.indent_level + 1);

        let mut children: HashMap<ItemId, Vec<&PlanItem>> = HashMap::new();
        let mut roots = Vec::new();
        for item in &snapshot.items {
            match item.parent_id.filter(|parent| id_map.contains_key(parent)) {
                Some(parent) => children.entry(parent).or_default().push(item),
                None => roots.push(item),
            }
        }
        let by_order = |a: &&PlanItem, b: &&PlanItem| a.sort_order.cmp(&b.sort_order);
        roots.sort_by(by_order);
        for list in children.values_mut() {
            list.sort_by(by_order);
        }

        let mut prepared = Vec::with_capacity(snapshot.items.len());
        let mut next_order = insert_order_start;
        let mut stack: Vec<(&PlanItem, Option<ItemId>, u32, bool)> = roots
            .iter()
            .rev()
            .map(|item| (*item, target_parent.map(|p| p.id), root_indent, true))
            .collect();

        while let Some((source, new_parent, indent, is_root)) = stack.pop() {
            let new_id = id_map[&source.id];
            let mut item = source.clone();
            item.id = new_id;
            item.project_id = target_project_id;
            item.parent_id = new_parent;
            item.indent_level = indent;
            item.sort_order = next_order;
            next_order += 1;

            item.progress = 0;
            item.status = ItemStatus::NotStarted;
            item.wbs = None;
            item.is_published = false;
            item.published_milestone_id = None;
            item.published_deliverable_id = None;
            item.created_at = None;
            item.updated_at = None;
            item.estimate_component_id = None;
            item.is_deleted = false;
            item.predecessors = source
                .predecessors
                .iter()
                .filter_map(|p| id_map.get(&p.id).map(|&id| Predecessor { id, ..*p }))
                .collect();
            if is_root {
                item.name.push_str(COPY_SUFFIX);
            }

            if let Some(kids) = children.get(&source.id) {
                stack.extend(kids.iter().rev().map(|kid| (*kid, Some(new_id), indent + 1, false)));
            }
            prepared.push(item);
        }

        Some(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(parent: &PlanItem, item_type: ItemType, name: &str, order: i64) -> PlanItem {
        PlanItem {
            parent_id: Some(parent.id),
            indent_level: parent.indent_level + 1,
            sort_order: order,
            ..PlanItem::new(parent.project_id, item_type, name)
        }
    }

    /// Milestone A > Deliverable B > Task C, plus an unrelated milestone.
    fn sample() -> Vec<PlanItem> {
        let a = PlanItem {
            status: ItemStatus::InProgress,
            progress: 60,
            wbs: Some("1".into()),
            is_published: true,
            estimate_component_id: Some("est-1".into()),
            sort_order: 10,
            ..PlanItem::new(1, ItemType::Milestone, "Milestone A")
        };
        let b = PlanItem {
            status: ItemStatus::Completed,
            progress: 100,
            ..child(&a, ItemType::Deliverable, "Deliverable B", 10)
        };
        let mut c = child(&b, ItemType::Task, "Task C", 10);
        let other = PlanItem {
            sort_order: 20,
            ..PlanItem::new(1, ItemType::Milestone, "Other")
        };
        c.predecessors = vec![
            Predecessor::finish_to_start(b.id),
            Predecessor::finish_to_start(other.id),
        ];
        vec![a, b, c, other]
    }

    #[test]
    fn test_copy_captures_descendants() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        assert!(!clipboard.has_data());

        let count = clipboard.copy(&[items[0].id], &items, false);
        assert_eq!(count, 3);
        assert_eq!(clipboard.count(), 3);
        assert!(!clipboard.is_cut_operation());
        assert_eq!(
            clipboard.source_ids(),
            vec![items[0].id, items[1].id, items[2].id]
        );
        assert_eq!(clipboard.snapshot().unwrap().source_project_id, 1);
    }

    #[test]
    fn test_copy_overlapping_selection_counts_once() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        let count = clipboard.copy(&[items[1].id, items[0].id, items[2].id], &items, true);
        assert_eq!(count, 3);
        assert!(clipboard.is_cut_operation());
        assert_eq!(clipboard.snapshot().unwrap().roots().count(), 1);
    }

    #[test]
    fn test_snapshot_is_independent_of_sources() {
        let mut items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[0].id], &items, false);
        items[0].name = "Renamed".into();
        assert_eq!(clipboard.snapshot().unwrap().items[0].name, "Milestone A");
    }

    #[test]
    fn test_prepare_for_paste_at_root() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[0].id], &items, false);

        let prepared = clipboard.prepare_for_paste(1, None, 100).unwrap();
        assert_eq!(prepared.len(), 3);
        let (a, b, c) = (&prepared[0], &prepared[1], &prepared[2]);

        assert_eq!(a.name, "Milestone A (Copy)");
        assert_eq!(b.name, "Deliverable B");
        assert_eq!(c.name, "Task C");
        assert_eq!(a.parent_id, None);
        assert_eq!(b.parent_id, Some(a.id));
        assert_eq!(c.parent_id, Some(b.id));
        assert_eq!(
            prepared.iter().map(|i| i.sort_order).collect::<Vec<_>>(),
            vec![100, 101, 102]
        );
        assert_eq!(
            prepared.iter().map(|i| i.indent_level).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        let source_ids: HashSet<ItemId> = items.iter().map(|i| i.id).collect();
        for item in &prepared {
            assert!(!source_ids.contains(&item.id));
            assert_eq!(item.progress, 0);
            assert_eq!(item.status, ItemStatus::NotStarted);
            assert_eq!(item.wbs, None);
            assert!(!item.is_published);
            assert_eq!(item.estimate_component_id, None);
        }
        // Internal dependency remapped, external one dropped.
        assert_eq!(c.predecessors, vec![Predecessor::finish_to_start(b.id)]);
    }

    #[test]
    fn test_prepare_for_paste_under_target() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[1].id], &items, false);

        let target = &items[3];
        let prepared = clipboard.prepare_for_paste(9, Some(target), 5).unwrap();
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].parent_id, Some(target.id));
        assert_eq!(prepared[0].indent_level, 1);
        assert_eq!(prepared[1].indent_level, 2);
        assert!(prepared.iter().all(|item| item.project_id == 9));
        assert_eq!(prepared[0].name, "Deliverable B (Copy)");
    }

    #[test]
    fn test_prepare_for_paste_empty_clipboard() {
        assert!(Clipboard::new().prepare_for_paste(1, None, 0).is_none());
    }

    #[test]
    fn test_validate_paste_rules() {
        let items = sample();
        let milestone = &items[0];
        let deliverable = &items[1];
        let mut clipboard = Clipboard::new();

        assert_eq!(
            clipboard.validate_paste(None).error.as_deref(),
            Some("Nothing to paste.")
        );

        let component = PlanItem::new(1, ItemType::Component, "Platform");
        clipboard.copy(&[component.id], std::slice::from_ref(&component), false);
        let verdict = clipboard.validate_paste(Some(milestone));
        assert!(!verdict.valid);
        assert_eq!(
            verdict.error.as_deref(),
            Some("Components can only be pasted at root level.")
        );
        assert!(clipboard.validate_paste(None).valid);

        clipboard.copy(&[deliverable.id], &items, false);
        assert_eq!(
            clipboard.validate_paste(None).error.as_deref(),
            Some("Only milestones and components can be pasted at root level.")
        );
        assert!(clipboard.validate_paste(Some(milestone)).valid);
        assert_eq!(
            clipboard.validate_paste(Some(deliverable)).error.as_deref(),
            Some("Cannot paste deliverable under deliverable.")
        );
    }

    #[test]
    fn test_validate_paste_is_idempotent() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[2].id], &items, false);
        let before = clipboard.snapshot().cloned();

        let first = clipboard.validate_paste(Some(&items[0]));
        let second = clipboard.validate_paste(Some(&items[0]));
        assert_eq!(first, second);
        assert_eq!(clipboard.snapshot().cloned(), before);
    }

    #[test]
    fn test_cut_cannot_paste_into_itself() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[0].id], &items, true);
        assert_eq!(
            clipboard.validate_paste(Some(&items[0])).error.as_deref(),
            Some("Cannot paste cut items into themselves.")
        );
    }

    #[test]
    fn test_copy_of_nothing_clears() {
        let items = sample();
        let mut clipboard = Clipboard::new();
        clipboard.copy(&[items[0].id], &items, false);
        assert_eq!(clipboard.copy(&[Uuid::new_v4()], &items, false), 0);
        assert!(!clipboard.has_data());
    }
}
