//! Item lifecycle operations for the Planner.

use std::collections::HashSet;

use uuid::Uuid;

use super::Planner;
use crate::{
    error::{PlanningError, Result},
    hierarchy,
    history::HistoryAction,
    models::{ItemId, ItemType, NewPlanItem, PlanItem},
    mutator::SORT_ORDER_STEP,
    params::{CreateItem, ImportNode, UpdateItem},
    store::PlanStore,
};

impl<S: PlanStore> Planner<S> {
    /// Creates one item under `params.parent_id`.
    ///
    /// When no type is given the item takes the type its parent calls for
    /// (a milestone at root level).
    pub async fn create_item(&mut self, params: &CreateItem) -> Result<PlanItem> {
        if params.name.trim().is_empty() {
            return Err(PlanningError::invalid_input("name").with_reason("cannot be empty"));
        }
        let status = params.parsed_status()?;
        let (start_date, end_date) = params.parsed_dates()?;

        let parent = params.parent_id.map(|id| self.require(id)).transpose()?;
        let parent_type = parent.map(|p| p.item_type);
        let item_type = params
            .item_type
            .unwrap_or_else(|| hierarchy::child_type(ItemType::Milestone, parent_type));
        if !hierarchy::is_valid_parent(item_type, parent_type) {
            return Err(PlanningError::validation(hierarchy::placement_error(
                item_type,
                parent_type,
            )));
        }

        let new_item = NewPlanItem {
            project_id: self.project_id,
            parent_id: params.parent_id,
            item_type,
            name: params.name.trim().to_string(),
            description: params.description.clone(),
            status,
            progress: 0,
            start_date,
            end_date,
            duration_days: params.duration_days,
            indent_level: parent.map_or(0, |p| p.indent_level + 1),
            sort_order: None,
            predecessors: Vec::new(),
            estimate_component_id: None,
        };

        let result = self.store.create_item(new_item).await;
        let created = self.persisted("Create item", result).await?;
        log::debug!("Created {} {}", created.item_type.as_str(), created.id);

        self.history.push(HistoryAction::Create { id: created.id });
        self.settle().await?;
        Ok(self.refetched(created))
    }

    /// Applies a partial update and records the previous values.
    pub async fn update_item(&mut self, params: &UpdateItem) -> Result<PlanItem> {
        let patch = params.to_patch()?;
        if patch.is_empty() {
            return Err(PlanningError::validation("Nothing to update."));
        }
        let previous = patch.capture_previous(self.require(params.id)?);

        let result = self.store.update_item(params.id, patch.clone()).await;
        let updated = self.persisted("Update item", result).await?;

        self.history.push(HistoryAction::Update {
            id: params.id,
            previous,
            new: patch,
        });
        self.settle().await?;
        Ok(self.refetched(updated))
    }

    /// Soft-deletes the selection together with every descendant.
    ///
    /// Returns all deleted ids, parents before children.
    pub async fn delete_items(&mut self, ids: &[ItemId]) -> Result<Vec<ItemId>> {
        if ids.is_empty() {
            return Err(PlanningError::validation("Nothing selected."));
        }
        let tree = self.tree();
        let mut seen = HashSet::new();
        let mut doomed = Vec::new();
        for &id in ids {
            if !tree.contains(id) {
                return Err(PlanningError::ItemNotFound { id });
            }
            for id in std::iter::once(id).chain(tree.descendant_ids(id)) {
                if seen.insert(id) {
                    doomed.push(id);
                }
            }
        }

        let result = self.store.soft_delete_batch(&doomed).await;
        self.persisted("Delete items", result).await?;

        let action = if ids.len() == 1 {
            HistoryAction::Delete {
                ids: doomed.clone(),
            }
        } else {
            HistoryAction::BatchDelete {
                ids: doomed.clone(),
            }
        };
        self.history.push(action);
        self.settle().await?;
        Ok(doomed)
    }

    /// Creates a nested outline under `parent_id` in one batch.
    ///
    /// Every node is checked against the nesting rules before anything is
    /// written; untyped nodes take the type their parent calls for.
    pub async fn import_structure(
        &mut self,
        nodes: &[ImportNode],
        parent_id: Option<ItemId>,
    ) -> Result<Vec<PlanItem>> {
        if nodes.is_empty() {
            return Err(PlanningError::validation("Nothing to import."));
        }
        let parent = parent_id.map(|id| self.require(id)).transpose()?;
        let first_order = self
            .tree()
            .children(parent_id)
            .iter()
            .map(|sibling| sibling.sort_order)
            .max()
            .map_or(SORT_ORDER_STEP, |max| max + SORT_ORDER_STEP);

        let mut prepared = Vec::new();
        let mut stack: Vec<(&ImportNode, Option<(ItemId, ItemType, u32)>, i64)> = nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| {
                let parent = parent.map(|p| (p.id, p.item_type, p.indent_level));
                (node, parent, first_order + i as i64 * SORT_ORDER_STEP)
            })
            .collect();

        while let Some((node, parent, sort_order)) = stack.pop() {
            node.validate()?;
            let parent_type = parent.map(|(_, item_type, _)| item_type);
            let item_type = node
                .item_type
                .unwrap_or_else(|| hierarchy::child_type(ItemType::Milestone, parent_type));
            if !hierarchy::is_valid_parent(item_type, parent_type) {
                return Err(PlanningError::validation(format!(
                    "Cannot import '{}': {}",
                    node.name,
                    hierarchy::placement_error(item_type, parent_type)
                )));
            }

            let item = PlanItem {
                id: Uuid::new_v4(),
                parent_id: parent.map(|(id, _, _)| id),
                description: node.description.clone(),
                status: node.status.unwrap_or_default(),
                progress: node.progress.unwrap_or(0),
                start_date: node.start_date,
                end_date: node.end_date,
                duration_days: node.duration_days,
                indent_level: parent.map_or(0, |(_, _, indent)| indent + 1),
                sort_order,
                ..PlanItem::new(self.project_id, item_type, node.name.trim())
            };
            let this = Some((item.id, item.item_type, item.indent_level));
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((child, this, (i as i64 + 1) * SORT_ORDER_STEP));
            }
            prepared.push(item);
        }

        let result = self.store.create_batch(self.project_id, prepared).await;
        let created = self.persisted("Import", result).await?;
        log::debug!("Imported {} items", created.len());

        self.history.push(HistoryAction::Import {
            created_ids: created.iter().map(|item| item.id).collect(),
        });
        self.settle().await?;
        Ok(created
            .into_iter()
            .map(|item| self.refetched(item))
            .collect())
    }
}
