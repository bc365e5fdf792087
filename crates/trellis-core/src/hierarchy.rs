//! Nesting policy for the work breakdown structure.
//!
//! | type        | allowed parent       | allowed children |
//! |-------------|----------------------|------------------|
//! | component   | root only            | milestone        |
//! | milestone   | root or component    | deliverable      |
//! | deliverable | milestone            | task             |
//! | task        | deliverable or task  | task             |
//!
//! Parents are expressed as `Option<ItemType>`, with `None` standing for the
//! project root. Every retyping decision (move, promote, demote and their
//! cascades onto descendants) goes through [`child_type`].

use crate::models::ItemType;

/// Parent types (with `None` for root) under which `item_type` may sit.
pub fn allowed_parents(item_type: ItemType) -> &'static [Option<ItemType>] {
    match item_type {
        ItemType::Component => &[None],
        ItemType::Milestone => &[None, Some(ItemType::Component)],
        ItemType::Deliverable => &[Some(ItemType::Milestone)],
        ItemType::Task => &[Some(ItemType::Deliverable), Some(ItemType::Task)],
    }
}

/// Child types `item_type` may contain.
pub fn allowed_children(item_type: ItemType) -> &'static [ItemType] {
    match item_type {
        ItemType::Component => &[ItemType::Milestone],
        ItemType::Milestone => &[ItemType::Deliverable],
        ItemType::Deliverable => &[ItemType::Task],
        ItemType::Task => &[ItemType::Task],
    }
}

/// Whether an item of `item_type` may sit under a parent of `parent_type`.
pub fn is_valid_parent(item_type: ItemType, parent_type: Option<ItemType>) -> bool {
    allowed_parents(item_type).contains(&parent_type)
}

/// The type an item of `current` type takes when placed under `parent`.
///
/// At root a component stays a component and anything else becomes a
/// milestone. Below root the parent alone decides.
pub fn child_type(current: ItemType, parent: Option<ItemType>) -> ItemType {
    match parent {
        None if current == ItemType::Component => ItemType::Component,
        None => ItemType::Milestone,
        Some(ItemType::Component) => ItemType::Milestone,
        Some(ItemType::Milestone) => ItemType::Deliverable,
        Some(ItemType::Deliverable) | Some(ItemType::Task) => ItemType::Task,
    }
}

/// The type an item takes when nested one level deeper under `new_parent`.
///
/// Components cannot be demoted, so they yield `None`.
pub fn demoted_type(current: ItemType, new_parent: ItemType) -> Option<ItemType> {
    if current == ItemType::Component {
        return None;
    }
    Some(child_type(current, Some(new_parent)))
}

/// The type an item takes when moved one level up under `new_parent`.
pub fn promoted_type(current: ItemType, new_parent: Option<ItemType>) -> ItemType {
    child_type(current, new_parent)
}

/// Human readable reason why `item_type` cannot sit under `parent_type`.
pub fn placement_error(item_type: ItemType, parent_type: Option<ItemType>) -> String {
    match parent_type {
        None => format!("A {} cannot be placed at root level.", item_type.as_str()),
        Some(parent) => format!(
            "A {} cannot be placed under a {}.",
            item_type.as_str(),
            parent.as_str()
        ),
    }
}
