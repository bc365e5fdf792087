//! Parent/child index over a flat list of plan items.
//!
//! [`TreeIndex`] is built once from a project's items and answers every
//! structural query the mutators, the clipboard and the UI need without
//! rescanning the list: items live in an arena and children are stored as
//! index lists sorted by `sort_order`.
//!
//! Deleted items are ignored. An item whose parent is missing or deleted is
//! kept in the arena (so it can still be looked up) but is attached to no
//! subtree and never shows up in [`TreeIndex::visible_items`].

use std::collections::{HashMap, HashSet};

use crate::models::{ItemId, ItemType, PlanItem};

/// Adjacency index over the non-deleted items of one project.
#[derive(Debug, Clone)]
pub struct TreeIndex<'a> {
    items: Vec<&'a PlanItem>,
    index: HashMap<ItemId, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

/// A visible row together with the UI-joined fields derived from the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRow<'a> {
    pub item: &'a PlanItem,
    pub children_count: usize,
    pub collapsed: bool,
}

impl<'a> TreeIndex<'a> {
    /// Builds the index from a flat item list.
    pub fn new(items: &'a [PlanItem]) -> Self {
        let items: Vec<&PlanItem> = items.iter().filter(|item| !item.is_deleted).collect();
        let index: HashMap<ItemId, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id, i))
            .collect();

        let mut children = vec![Vec::new(); items.len()];
        let mut roots = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match item.parent_id {
                None => roots.push(i),
                Some(parent_id) => {
                    if let Some(&parent) = index.get(&parent_id) {
                        children[parent].push(i);
                    }
                }
            }
        }

        let order = |a: &usize, b: &usize| {
            let (a, b) = (items[*a], items[*b]);
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        };
        roots.sort_by(order);
        for list in &mut children {
            list.sort_by(order);
        }

        Self {
            items,
            index,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&'a PlanItem> {
        self.index.get(&id).map(|&i| self.items[i])
    }

    /// Root items in sibling order.
    pub fn roots(&self) -> Vec<&'a PlanItem> {
        self.roots.iter().map(|&i| self.items[i]).collect()
    }

    /// Direct children of `parent` in sibling order; `None` lists the roots.
    pub fn children(&self, parent: Option<ItemId>) -> Vec<&'a PlanItem> {
        match parent {
            None => self.roots(),
            Some(id) => self
                .index
                .get(&id)
                .map(|&i| self.children[i].iter().map(|&c| self.items[c]).collect())
                .unwrap_or_default(),
        }
    }

    /// Count of direct, non-deleted children.
    pub fn children_count(&self, id: ItemId) -> usize {
        self.index
            .get(&id)
            .map(|&i| self.children[i].len())
            .unwrap_or(0)
    }

    /// The parent item, when it exists and is not deleted.
    pub fn parent_of(&self, id: ItemId) -> Option<&'a PlanItem> {
        self.get(id)?.parent_id.and_then(|parent| self.get(parent))
    }

    /// Type of the parent of `item`, `None` for root items.
    pub fn parent_type(&self, item: &PlanItem) -> Option<ItemType> {
        item.parent_id
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.item_type)
    }

    /// All items transitively parented under `id`, parents before children.
    pub fn descendants(&self, id: ItemId) -> Vec<&'a PlanItem> {
        let Some(&start) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut seen = HashSet::from([start]);
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children[start].iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            if !seen.insert(i) {
                continue;
            }
            out.push(self.items[i]);
            stack.extend(self.children[i].iter().rev());
        }
        out
    }

    pub fn descendant_ids(&self, id: ItemId) -> Vec<ItemId> {
        self.descendants(id).into_iter().map(|item| item.id).collect()
    }

    /// Whether `id` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, id: ItemId, ancestor: ItemId) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.get(id).and_then(|item| item.parent_id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            current = self.get(parent).and_then(|item| item.parent_id);
        }
        false
    }

    /// The sibling immediately before `id` in sort order.
    pub fn previous_sibling(&self, id: ItemId) -> Option<&'a PlanItem> {
        let item = self.get(id)?;
        let siblings = self.children(item.parent_id);
        let position = siblings.iter().position(|sibling| sibling.id == id)?;
        position.checked_sub(1).map(|p| siblings[p])
    }

    /// Depth-first walk of the whole forest.
    pub fn depth_first(&self) -> VisibleItems<'_, 'a> {
        VisibleItems::new(self, None)
    }

    /// Depth-first walk skipping the subtrees under collapsed items. The
    /// collapsed items themselves are still yielded.
    pub fn visible_items<'t>(&'t self, collapsed: &'t HashSet<ItemId>) -> VisibleItems<'t, 'a> {
        VisibleItems::new(self, Some(collapsed))
    }

    /// Visible items joined with their child counts and collapse state.
    pub fn visible_rows(&self, collapsed: &HashSet<ItemId>) -> Vec<VisibleRow<'a>> {
        self.visible_items(collapsed)
            .map(|item| VisibleRow {
                item,
                children_count: self.children_count(item.id),
                collapsed: collapsed.contains(&item.id),
            })
            .collect()
    }

    /// Position of every reachable item in depth-first order.
    pub fn tree_positions(&self) -> HashMap<ItemId, usize> {
        self.depth_first()
            .enumerate()
            .map(|(position, item)| (item.id, position))
            .collect()
    }
}

/// Lazy depth-first iterator over a [`TreeIndex`].
#[derive(Debug, Clone)]
pub struct VisibleItems<'t, 'a> {
    tree: &'t TreeIndex<'a>,
    collapsed: Option<&'t HashSet<ItemId>>,
    stack: Vec<usize>,
}

impl<'t, 'a> VisibleItems<'t, 'a> {
    fn new(tree: &'t TreeIndex<'a>, collapsed: Option<&'t HashSet<ItemId>>) -> Self {
        Self {
            tree,
            collapsed,
            stack: tree.roots.iter().rev().copied().collect(),
        }
    }
}

impl<'t, 'a> Iterator for VisibleItems<'t, 'a> {
    type Item = &'a PlanItem;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.stack.pop()?;
        let item = self.tree.items[i];
        let collapsed = self
            .collapsed
            .map_or(false, |collapsed| collapsed.contains(&item.id));
        if !collapsed {
            self.stack.extend(self.tree.children[i].iter().rev());
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, item_type: ItemType, parent: Option<&PlanItem>, order: i64) -> PlanItem {
        PlanItem {
            parent_id: parent.map(|p| p.id),
            indent_level: parent.map_or(0, |p| p.indent_level + 1),
            sort_order: order,
            ..PlanItem::new(1, item_type, name)
        }
    }

    fn names<'a>(items: impl IntoIterator<Item = &'a PlanItem>) -> Vec<&'a str> {
        items.into_iter().map(|item| item.name.as_str()).collect()
    }

    fn sample() -> Vec<PlanItem> {
        let m1 = item("M1", ItemType::Milestone, None, 20);
        let m0 = item("M0", ItemType::Milestone, None, 10);
        let d1 = item("D1", ItemType::Deliverable, Some(&m1), 10);
        let d2 = item("D2", ItemType::Deliverable, Some(&m1), 5);
        let t1 = item("T1", ItemType::Task, Some(&d1), 10);
        let t2 = item("T2", ItemType::Task, Some(&t1), 10);
        vec![t2, m1, d1, m0, d2, t1]
    }

    #[test]
    fn test_depth_first_respects_sort_order() {
        let items = sample();
        let tree = TreeIndex::new(&items);
        assert_eq!(
            names(tree.depth_first()),
            vec!["M0", "M1", "D2", "D1", "T1", "T2"]
        );
    }

    #[test]
    fn test_collapsed_subtrees_are_skipped() {
        let items = sample();
        let tree = TreeIndex::new(&items);
        let d1 = items.iter().find(|i| i.name == "D1").unwrap().id;
        let collapsed = HashSet::from([d1]);

        assert_eq!(
            names(tree.visible_items(&collapsed)),
            vec!["M0", "M1", "D2", "D1"]
        );
        // Restartable: a second walk yields the same rows.
        assert_eq!(tree.visible_items(&collapsed).count(), 4);

        let rows = tree.visible_rows(&collapsed);
        let d1_row = rows.iter().find(|row| row.item.id == d1).unwrap();
        assert!(d1_row.collapsed);
        assert_eq!(d1_row.children_count, 1);
    }

    #[test]
    fn test_descendants_and_counts() {
        let items = sample();
        let tree = TreeIndex::new(&items);
        let m1 = items.iter().find(|i| i.name == "M1").unwrap().id;
        let t2 = items.iter().find(|i| i.name == "T2").unwrap().id;

        let mut found = names(tree.descendants(m1));
        found.sort_unstable();
        assert_eq!(found, vec!["D1", "D2", "T1", "T2"]);
        assert_eq!(tree.children_count(m1), 2);
        assert!(tree.is_descendant(t2, m1));
        assert!(!tree.is_descendant(m1, t2));
        assert!(tree.descendants(t2).is_empty());
    }

    #[test]
    fn test_orphans_and_deleted_items_are_excluded() {
        let mut items = sample();
        let mut ghost = item("Ghost", ItemType::Milestone, None, 99);
        ghost.is_deleted = true;
        let orphan = item("Orphan", ItemType::Deliverable, Some(&ghost), 1);
        let dangling = PlanItem {
            parent_id: Some(uuid::Uuid::new_v4()),
            ..PlanItem::new(1, ItemType::Task, "Dangling")
        };
        items.extend([ghost, orphan, dangling]);

        let tree = TreeIndex::new(&items);
        let visible = names(tree.depth_first());
        assert!(!visible.contains(&"Ghost"));
        assert!(!visible.contains(&"Orphan"));
        assert!(!visible.contains(&"Dangling"));
        assert_eq!(visible.len(), 6);
    }

    #[test]
    fn test_previous_sibling() {
        let items = sample();
        let tree = TreeIndex::new(&items);
        let d1 = items.iter().find(|i| i.name == "D1").unwrap().id;
        let d2 = items.iter().find(|i| i.name == "D2").unwrap().id;
        assert_eq!(tree.previous_sibling(d1).map(|i| i.id), Some(d2));
        assert!(tree.previous_sibling(d2).is_none());
    }

    #[test]
    fn test_empty_tree() {
        let items: Vec<PlanItem> = Vec::new();
        let tree = TreeIndex::new(&items);
        assert!(tree.is_empty());
        assert_eq!(tree.depth_first().count(), 0);
        assert!(tree.descendants(uuid::Uuid::new_v4()).is_empty());
    }
}
