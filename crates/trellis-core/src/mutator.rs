//! Structural changes to the work breakdown tree.
//!
//! Every function here is pure: it validates a gesture against a
//! [`TreeIndex`] and returns the placement changes the planner must persist.
//! A rejected gesture returns a validation error and nothing else, so no
//! store call is ever made for it.
//!
//! Retyping always goes through [`hierarchy::child_type`], both for the item
//! being moved and for the descendants that follow it, which keeps
//! `indent_level` and the nesting table consistent across the whole subtree.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{PlanningError, Result},
    hierarchy,
    history::Reparent,
    models::{ItemId, ItemType, PlanItem, Placement, PlacementChange},
    tree::TreeIndex,
};

/// Spacing between sibling sort orders after resequencing.
pub const SORT_ORDER_STEP: i64 = 10;

/// Where a dragged selection lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Placement changes of a move or drop gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub item_ids: Vec<ItemId>,
    pub new_parent_id: Option<ItemId>,
    pub new_sort_order: Option<i64>,
    pub changes: Vec<PlacementChange>,
}

/// A validated drop: which items move, under which parent and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPlan {
    /// Normalized selection (no item whose ancestor is also selected), in
    /// tree order
    pub item_ids: Vec<ItemId>,
    /// Normalized selection plus all descendants
    pub dragged: HashSet<ItemId>,
    pub new_parent_id: Option<ItemId>,
    /// Position among the new parent's remaining children
    pub insert_index: usize,
}

/// Moves `id` under `new_parent_id` at `new_sort_order`, cascading type and
/// indent to its descendants and resequencing the new siblings.
pub fn plan_move(
    tree: &TreeIndex<'_>,
    id: ItemId,
    new_parent_id: Option<ItemId>,
    new_sort_order: i64,
) -> Result<MovePlan> {
    let item = tree.get(id).ok_or(PlanningError::ItemNotFound { id })?;
    let parent = resolve_parent(tree, new_parent_id)?;

    if new_parent_id == Some(id)
        || new_parent_id.map_or(false, |parent| tree.is_descendant(parent, id))
    {
        return Err(PlanningError::validation(
            "Cannot move an item under itself or its descendants.",
        ));
    }
    let parent_type = parent.map(|p| p.item_type);
    if !hierarchy::is_valid_parent(item.item_type, parent_type) {
        return Err(PlanningError::validation(hierarchy::placement_error(
            item.item_type,
            parent_type,
        )));
    }

    let insert_index = tree
        .children(new_parent_id)
        .iter()
        .filter(|sibling| sibling.id != id && sibling.sort_order < new_sort_order)
        .count();
    let changes = relocate(tree, &[item], parent, insert_index);

    Ok(MovePlan {
        item_ids: vec![id],
        new_parent_id,
        new_sort_order: Some(new_sort_order),
        changes,
    })
}

/// Moves `id` one level up, right after its former parent.
pub fn plan_promote(tree: &TreeIndex<'_>, id: ItemId) -> Result<Reparent> {
    let item = tree.get(id).ok_or(PlanningError::ItemNotFound { id })?;
    let Some(parent_id) = item.parent_id else {
        return Err(PlanningError::validation("Already at root level."));
    };
    let parent = tree
        .get(parent_id)
        .ok_or(PlanningError::ItemNotFound { id: parent_id })?;
    let grandparent = resolve_parent(tree, parent.parent_id)?;
    let grandparent_type = grandparent.map(|g| g.item_type);

    let new_type = hierarchy::promoted_type(item.item_type, grandparent_type);
    if !hierarchy::is_valid_parent(new_type, grandparent_type) {
        return Err(PlanningError::validation(hierarchy::placement_error(
            new_type,
            grandparent_type,
        )));
    }

    let insert_index = tree
        .children(parent.parent_id)
        .iter()
        .position(|sibling| sibling.id == parent.id)
        .map_or(0, |position| position + 1);
    let changes = relocate(tree, &[item], grandparent, insert_index);
    Ok(reparent(item, changes))
}

/// Moves `id` one level down, as the last child of its previous sibling.
pub fn plan_demote(tree: &TreeIndex<'_>, id: ItemId) -> Result<Reparent> {
    let item = tree.get(id).ok_or(PlanningError::ItemNotFound { id })?;
    if item.item_type == ItemType::Component {
        return Err(PlanningError::validation("Components cannot be demoted."));
    }
    let Some(sibling) = tree.previous_sibling(id) else {
        return Err(PlanningError::validation(
            "No previous sibling to become parent.",
        ));
    };

    let new_type = hierarchy::demoted_type(item.item_type, sibling.item_type)
        .ok_or_else(|| PlanningError::validation("Components cannot be demoted."))?;
    if !hierarchy::is_valid_parent(new_type, Some(sibling.item_type)) {
        return Err(PlanningError::validation(hierarchy::placement_error(
            new_type,
            Some(sibling.item_type),
        )));
    }

    let insert_index = tree.children_count(sibling.id);
    let changes = relocate(tree, &[item], Some(sibling), insert_index);
    Ok(reparent(item, changes))
}

/// Validates dropping `selection` on `target_id` at `position`.
pub fn validate_drop(
    tree: &TreeIndex<'_>,
    selection: &[ItemId],
    target_id: ItemId,
    position: DropPosition,
) -> Result<DropPlan> {
    if selection.is_empty() {
        return Err(PlanningError::validation("Nothing selected."));
    }
    let selected: HashSet<ItemId> = selection
        .iter()
        .map(|&id| tree.get(id).map(|item| item.id).ok_or(PlanningError::ItemNotFound { id }))
        .collect::<Result<_>>()?;

    let positions = tree.tree_positions();
    let mut roots: Vec<&PlanItem> = selected
        .iter()
        .filter(|&&id| !selected.iter().any(|&other| tree.is_descendant(id, other)))
        .filter_map(|&id| tree.get(id))
        .collect();
    roots.sort_by_key(|item| positions.get(&item.id).copied().unwrap_or(usize::MAX));

    let mut dragged: HashSet<ItemId> = HashSet::new();
    for root in &roots {
        dragged.insert(root.id);
        dragged.extend(tree.descendant_ids(root.id));
    }

    let target = tree
        .get(target_id)
        .ok_or(PlanningError::ItemNotFound { id: target_id })?;
    if dragged.contains(&target.id) {
        return Err(PlanningError::validation("Cannot drop parent onto child."));
    }

    let new_parent = match position {
        DropPosition::Inside => Some(target),
        DropPosition::Before | DropPosition::After => resolve_parent(tree, target.parent_id)?,
    };
    let parent_type = new_parent.map(|p| p.item_type);
    for root in &roots {
        if !hierarchy::is_valid_parent(root.item_type, parent_type) {
            return Err(PlanningError::validation(hierarchy::placement_error(
                root.item_type,
                parent_type,
            )));
        }
    }

    let new_parent_id = new_parent.map(|p| p.id);
    let remaining: Vec<&PlanItem> = tree
        .children(new_parent_id)
        .into_iter()
        .filter(|sibling| !dragged.contains(&sibling.id))
        .collect();
    let insert_index = match position {
        DropPosition::Inside => remaining.len(),
        DropPosition::Before | DropPosition::After => {
            let at = remaining
                .iter()
                .position(|sibling| sibling.id == target.id)
                .unwrap_or(remaining.len());
            if position == DropPosition::After {
                at + 1
            } else {
                at
            }
        }
    };

    Ok(DropPlan {
        item_ids: roots.iter().map(|item| item.id).collect(),
        dragged,
        new_parent_id,
        insert_index,
    })
}

/// Validates and plans dropping `selection` on `target_id`.
pub fn plan_drop(
    tree: &TreeIndex<'_>,
    selection: &[ItemId],
    target_id: ItemId,
    position: DropPosition,
) -> Result<MovePlan> {
    let drop = validate_drop(tree, selection, target_id, position)?;
    let parent = resolve_parent(tree, drop.new_parent_id)?;
    let moving: Vec<&PlanItem> = drop.item_ids.iter().filter_map(|&id| tree.get(id)).collect();
    let changes = relocate(tree, &moving, parent, drop.insert_index);
    let new_sort_order = drop.item_ids.first().and_then(|first| {
        changes
            .iter()
            .find(|change| change.id == *first)
            .map(|change| change.after.sort_order)
    });

    Ok(MovePlan {
        item_ids: drop.item_ids,
        new_parent_id: drop.new_parent_id,
        new_sort_order,
        changes,
    })
}

fn resolve_parent<'a>(
    tree: &TreeIndex<'a>,
    parent_id: Option<ItemId>,
) -> Result<Option<&'a PlanItem>> {
    parent_id
        .map(|id| tree.get(id).ok_or(PlanningError::ItemNotFound { id }))
        .transpose()
}

fn reparent(item: &PlanItem, changes: Vec<PlacementChange>) -> Reparent {
    let new = changes
        .iter()
        .find(|change| change.id == item.id)
        .map_or_else(|| item.placement(), |change| change.after);
    Reparent {
        id: item.id,
        previous: item.placement(),
        new,
        affected: changes.into_iter().filter(|change| change.id != item.id).collect(),
    }
}

/// Places `moving` (in order) under `parent` at `insert_index` among the
/// parent's other children. Siblings are resequenced, moved items retyped and
/// re-indented, and the change cascades to every descendant. Only items
/// whose placement actually changes are returned.
fn relocate(
    tree: &TreeIndex<'_>,
    moving: &[&PlanItem],
    parent: Option<&PlanItem>,
    insert_index: usize,
) -> Vec<PlacementChange> {
    let moving_ids: HashSet<ItemId> = moving.iter().map(|item| item.id).collect();
    let parent_id = parent.map(|p| p.id);
    let parent_type = parent.map(|p| p.item_type);
    let indent = parent.map_or(0, |p| p.indent_level + 1);

    let mut siblings: Vec<&PlanItem> = tree
        .children(parent_id)
        .into_iter()
        .filter(|sibling| !moving_ids.contains(&sibling.id))
        .collect();
    let tail = siblings.split_off(insert_index.min(siblings.len()));
    siblings.extend(moving.iter().copied());
    siblings.extend(tail);

    let mut placements: HashMap<ItemId, Placement> = HashMap::new();
    let mut order: Vec<&PlanItem> = Vec::new();
    for (position, sibling) in siblings.iter().enumerate() {
        let mut placement = sibling.placement();
        placement.sort_order = (position as i64 + 1) * SORT_ORDER_STEP;
        if moving_ids.contains(&sibling.id) {
            placement.parent_id = parent_id;
            placement.item_type = hierarchy::child_type(sibling.item_type, parent_type);
            placement.indent_level = indent;
        }
        placements.insert(sibling.id, placement);
        order.push(sibling);
    }

    for item in moving {
        for descendant in tree.descendants(item.id) {
            let Some(parent) = descendant.parent_id.and_then(|p| placements.get(&p)).copied()
            else {
                continue;
            };
            let mut placement = descendant.placement();
            placement.item_type = hierarchy::child_type(descendant.item_type, Some(parent.item_type));
            placement.indent_level = parent.indent_level + 1;
            placements.insert(descendant.id, placement);
            order.push(descendant);
        }
    }

    order
        .into_iter()
        .filter_map(|item| {
            let after = placements[&item.id];
            let before = item.placement();
            (after != before).then_some(PlacementChange {
                id: item.id,
                before,
                after,
            })
        })
        .collect()
}
