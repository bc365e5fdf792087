//! Undo and redo for the Planner.

use super::Planner;
use crate::{
    error::Result,
    history::{HistoryAction, HistoryEntry},
    models::ItemPatch,
    store::PlanStore,
};

impl<S: PlanStore> Planner<S> {
    /// Reverts the most recent action. Returns `None` when there is nothing
    /// to undo.
    ///
    /// If the store rejects the inverse, the entry goes back on the undo
    /// stack so the user can retry.
    pub async fn undo(&mut self) -> Result<Option<HistoryEntry>> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(None);
        };
        log::debug!("Undo {}", entry.action.type_name());

        let result = self.revert(&entry.action).await;
        if let Err(err) = result {
            self.history.requeue_undo(entry);
            return Err(self.reconcile("Undo", err).await);
        }
        self.settle().await?;
        Ok(Some(entry))
    }

    /// Re-applies the most recently undone action.
    pub async fn redo(&mut self) -> Result<Option<HistoryEntry>> {
        let Some(entry) = self.history.pop_redo() else {
            return Ok(None);
        };
        log::debug!("Redo {}", entry.action.type_name());

        let result = self.reapply(&entry.action).await;
        if let Err(err) = result {
            self.history.requeue_redo(entry);
            return Err(self.reconcile("Redo", err).await);
        }
        self.settle().await?;
        Ok(Some(entry))
    }

    async fn revert(&self, action: &HistoryAction) -> Result<()> {
        match action {
            HistoryAction::Create { id } => self.store.soft_delete_batch(&[*id]).await,
            HistoryAction::Update { id, previous, .. } => {
                self.store.update_item(*id, previous.clone()).await?;
                Ok(())
            }
            HistoryAction::Delete { ids } | HistoryAction::BatchDelete { ids } => {
                self.store.restore(ids).await
            }
            HistoryAction::Paste {
                created_ids,
                cut_ids,
            } => {
                self.store.soft_delete_batch(created_ids).await?;
                if !cut_ids.is_empty() {
                    self.store.restore(cut_ids).await?;
                }
                Ok(())
            }
            HistoryAction::Promote(reparent) | HistoryAction::Demote(reparent) => {
                self.write_placements(&reparent.changes(), false).await
            }
            HistoryAction::Move { changes, .. } => self.write_placements(changes, false).await,
            HistoryAction::Link { changes } => {
                for change in changes {
                    let patch = ItemPatch::predecessors(change.previous.clone());
                    self.store.update_item(change.id, patch).await?;
                }
                Ok(())
            }
            HistoryAction::Import { created_ids } => {
                self.store.soft_delete_batch(created_ids).await
            }
        }
    }

    async fn reapply(&self, action: &HistoryAction) -> Result<()> {
        match action {
            HistoryAction::Create { id } => self.store.restore(&[*id]).await,
            HistoryAction::Update { id, new, .. } => {
                self.store.update_item(*id, new.clone()).await?;
                Ok(())
            }
            HistoryAction::Delete { ids } | HistoryAction::BatchDelete { ids } => {
                self.store.soft_delete_batch(ids).await
            }
            HistoryAction::Paste {
                created_ids,
                cut_ids,
            } => {
                self.store.restore(created_ids).await?;
                if !cut_ids.is_empty() {
                    self.store.soft_delete_batch(cut_ids).await?;
                }
                Ok(())
            }
            HistoryAction::Promote(reparent) | HistoryAction::Demote(reparent) => {
                self.write_placements(&reparent.changes(), true).await
            }
            HistoryAction::Move { changes, .. } => self.write_placements(changes, true).await,
            HistoryAction::Link { changes } => {
                for change in changes {
                    let patch = ItemPatch::predecessors(change.new.clone());
                    self.store.update_item(change.id, patch).await?;
                }
                Ok(())
            }
            HistoryAction::Import { created_ids } => self.store.restore(created_ids).await,
        }
    }
}
