//! Plan item model, partial updates and structural placements.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DependencyType, ItemStatus, ItemType};

/// Identifier of a plan item. Stable for the lifetime of the item.
pub type ItemId = Uuid;

/// A dependency edge pointing into the item that owns it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Predecessor {
    /// The item this one depends on
    pub id: ItemId,

    /// Scheduling relationship
    #[serde(rename = "type", default)]
    pub dependency_type: DependencyType,

    /// Lag (positive) or lead (negative) in days
    #[serde(default)]
    pub lag: i32,
}

impl Predecessor {
    /// A plain finish-to-start dependency without lag.
    pub fn finish_to_start(id: ItemId) -> Self {
        Self {
            id,
            dependency_type: DependencyType::FS,
            lag: 0,
        }
    }
}

/// Node in the work breakdown structure of a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    /// Unique identifier for the item
    pub id: ItemId,

    /// ID of the owning project
    pub project_id: u64,

    /// Parent item, `None` at root
    pub parent_id: Option<ItemId>,

    /// Hierarchy level of the item
    pub item_type: ItemType,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: ItemStatus,

    /// Completion percentage, 0 to 100
    #[serde(default)]
    pub progress: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,

    /// Depth in the tree; always the parent's level plus one
    #[serde(default)]
    pub indent_level: u32,

    /// Relative order among siblings
    #[serde(default)]
    pub sort_order: i64,

    /// Dotted outline number, recomputed by the store after structural changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,

    /// Dependency edges pointing into this item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predecessors: Vec<Predecessor>,

    /// Link to an external costing entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_component_id: Option<String>,

    #[serde(default)]
    pub is_published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_milestone_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_deliverable_id: Option<String>,

    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl PlanItem {
    /// Creates a root-level item with defaults for every optional field.
    pub fn new(project_id: u64, item_type: ItemType, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            parent_id: None,
            item_type,
            name: name.into(),
            description: None,
            status: ItemStatus::NotStarted,
            progress: 0,
            start_date: None,
            end_date: None,
            duration_days: None,
            indent_level: 0,
            sort_order: 0,
            wbs: None,
            predecessors: Vec::new(),
            estimate_component_id: None,
            is_published: false,
            published_milestone_id: None,
            published_deliverable_id: None,
            is_deleted: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// The structural quadruple of this item.
    pub fn placement(&self) -> Placement {
        Placement {
            parent_id: self.parent_id,
            sort_order: self.sort_order,
            item_type: self.item_type,
            indent_level: self.indent_level,
        }
    }

    /// Whether `id` appears among this item's predecessors.
    pub fn depends_on(&self, id: ItemId) -> bool {
        self.predecessors.iter().any(|p| p.id == id)
    }

    /// Applies every field set in `patch` to this item.
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(item_type) = patch.item_type {
            self.item_type = item_type;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(duration_days) = patch.duration_days {
            self.duration_days = duration_days;
        }
        if let Some(indent_level) = patch.indent_level {
            self.indent_level = indent_level;
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(predecessors) = &patch.predecessors {
            self.predecessors = predecessors.clone();
        }
        if let Some(estimate_component_id) = &patch.estimate_component_id {
            self.estimate_component_id = estimate_component_id.clone();
        }
    }
}

/// Fields for creating a single item. The store assigns the identifier and,
/// when `sort_order` is absent, places the item after its last sibling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPlanItem {
    pub project_id: u64,
    pub parent_id: Option<ItemId>,
    pub item_type: ItemType,
    pub name: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub progress: u8,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub duration_days: Option<u32>,
    pub indent_level: u32,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub predecessors: Vec<Predecessor>,
    pub estimate_component_id: Option<String>,
}

impl NewPlanItem {
    /// Materializes the draft with a fresh identifier and the given order.
    pub fn into_item(self, sort_order: i64, now: Timestamp) -> PlanItem {
        PlanItem {
            parent_id: self.parent_id,
            description: self.description,
            status: self.status,
            progress: self.progress,
            start_date: self.start_date,
            end_date: self.end_date,
            duration_days: self.duration_days,
            indent_level: self.indent_level,
            sort_order,
            predecessors: self.predecessors,
            estimate_component_id: self.estimate_component_id,
            created_at: Some(now),
            updated_at: Some(now),
            ..PlanItem::new(self.project_id, self.item_type, self.name)
        }
    }
}

/// Structural position of an item: parent, order, type and depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: Option<ItemId>,
    pub sort_order: i64,
    pub item_type: ItemType,
    pub indent_level: u32,
}

/// Before and after placement of one item touched by a structural change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementChange {
    pub id: ItemId,
    pub before: Placement,
    pub after: Placement,
}

/// Partial update of a plan item. `None` leaves a field untouched; nullable
/// fields use a nested option so they can be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<ItemId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<Date>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<Date>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessors: Option<Vec<Predecessor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_component_id: Option<Option<String>>,
}

impl ItemPatch {
    /// Patch writing a full placement.
    pub fn placement(placement: &Placement) -> Self {
        Self {
            parent_id: Some(placement.parent_id),
            sort_order: Some(placement.sort_order),
            item_type: Some(placement.item_type),
            indent_level: Some(placement.indent_level),
            ..Default::default()
        }
    }

    /// Patch replacing the predecessor list.
    pub fn predecessors(predecessors: Vec<Predecessor>) -> Self {
        Self {
            predecessors: Some(predecessors),
            ..Default::default()
        }
    }

    /// True when the patch touches the tree structure.
    pub fn is_structural(&self) -> bool {
        self.parent_id.is_some()
            || self.item_type.is_some()
            || self.indent_level.is_some()
            || self.sort_order.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this patch sets.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut note = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        note(self.parent_id.is_some(), "parent");
        note(self.item_type.is_some(), "type");
        note(self.name.is_some(), "name");
        note(self.description.is_some(), "description");
        note(self.status.is_some(), "status");
        note(self.progress.is_some(), "progress");
        note(self.start_date.is_some(), "start date");
        note(self.end_date.is_some(), "end date");
        note(self.duration_days.is_some(), "duration");
        note(self.indent_level.is_some(), "indent");
        note(self.sort_order.is_some(), "order");
        note(self.predecessors.is_some(), "predecessors");
        note(self.estimate_component_id.is_some(), "estimate");
        fields
    }

    /// A patch that would restore `item`'s current values for every field
    /// this patch sets.
    pub fn capture_previous(&self, item: &PlanItem) -> ItemPatch {
        ItemPatch {
            parent_id: self.parent_id.map(|_| item.parent_id),
            item_type: self.item_type.map(|_| item.item_type),
            name: self.name.as_ref().map(|_| item.name.clone()),
            description: self.description.as_ref().map(|_| item.description.clone()),
            status: self.status.map(|_| item.status),
            progress: self.progress.map(|_| item.progress),
            start_date: self.start_date.map(|_| item.start_date),
            end_date: self.end_date.map(|_| item.end_date),
            duration_days: self.duration_days.map(|_| item.duration_days),
            indent_level: self.indent_level.map(|_| item.indent_level),
            sort_order: self.sort_order.map(|_| item.sort_order),
            predecessors: self.predecessors.as_ref().map(|_| item.predecessors.clone()),
            estimate_component_id: self
                .estimate_component_id
                .as_ref()
                .map(|_| item.estimate_component_id.clone()),
        }
    }
}
