//! Structural operations: move, promote, demote and drag-and-drop.

use super::Planner;
use crate::{
    error::Result,
    history::{HistoryAction, Reparent},
    models::{ItemId, PlanItem},
    mutator::{self, DropPlan, MovePlan},
    params::{DropItems, MoveItem},
    store::PlanStore,
};

impl<S: PlanStore> Planner<S> {
    /// Moves an item under a new parent, retyping and re-indenting its
    /// subtree and resequencing the new siblings.
    pub async fn move_item(&mut self, params: &MoveItem) -> Result<PlanItem> {
        let plan = mutator::plan_move(&self.tree(), params.id, params.parent_id, params.sort_order)?;
        self.apply_move("Move", plan).await?;
        Ok(self.require(params.id)?.clone())
    }

    /// Moves an item one level up, right after its former parent.
    pub async fn promote(&mut self, id: ItemId) -> Result<PlanItem> {
        let plan = mutator::plan_promote(&self.tree(), id)?;
        self.apply_reparent("Promote", HistoryAction::Promote, plan)
            .await
    }

    /// Moves an item one level down, under its previous sibling.
    pub async fn demote(&mut self, id: ItemId) -> Result<PlanItem> {
        let plan = mutator::plan_demote(&self.tree(), id)?;
        self.apply_reparent("Demote", HistoryAction::Demote, plan)
            .await
    }

    /// Checks a drop without changing anything.
    pub fn validate_drop(&self, params: &DropItems) -> Result<DropPlan> {
        mutator::validate_drop(
            &self.tree(),
            &params.selection,
            params.target_id,
            params.position,
        )
    }

    /// Drops the selection on the target. Returns the moved top-level items.
    pub async fn drop_items(&mut self, params: &DropItems) -> Result<Vec<PlanItem>> {
        let plan = mutator::plan_drop(
            &self.tree(),
            &params.selection,
            params.target_id,
            params.position,
        )?;
        let moved = plan.item_ids.clone();
        self.apply_move("Drop", plan).await?;
        Ok(moved
            .into_iter()
            .filter_map(|id| self.item(id).cloned())
            .collect())
    }

    async fn apply_move(&mut self, gesture: &str, plan: MovePlan) -> Result<()> {
        let result = self.write_placements(&plan.changes, true).await;
        self.persisted(gesture, result).await?;
        log::debug!("{gesture}: {} placements written", plan.changes.len());

        self.history.push(HistoryAction::Move {
            item_ids: plan.item_ids,
            changes: plan.changes,
            new_parent_id: plan.new_parent_id,
            new_sort_order: plan.new_sort_order,
        });
        self.settle().await
    }

    async fn apply_reparent(
        &mut self,
        gesture: &str,
        action: fn(Reparent) -> HistoryAction,
        plan: Reparent,
    ) -> Result<PlanItem> {
        let result = self.write_placements(&plan.changes(), true).await;
        self.persisted(gesture, result).await?;
        log::debug!(
            "{gesture}: {} is now a {}",
            plan.id,
            plan.new.item_type.as_str()
        );

        let id = plan.id;
        self.history.push(action(plan));
        self.settle().await?;
        Ok(self.require(id)?.clone())
    }
}
