//! Copy, cut and paste for the Planner.

use super::Planner;
use crate::{
    error::{PlanningError, Result},
    history::HistoryAction,
    models::{ItemId, PlanItem},
    store::PlanStore,
};

/// Items created by a paste and, for a cut, the originals it removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteOutcome {
    pub created: Vec<PlanItem>,
    pub cut_ids: Vec<ItemId>,
}

impl<S: PlanStore> Planner<S> {
    /// Copies the selection and its descendants. Returns the captured count.
    pub fn copy(&mut self, ids: &[ItemId]) -> Result<usize> {
        self.capture(ids, false)
    }

    /// Like [`Planner::copy`], but the originals are deleted by the next
    /// paste.
    pub fn cut(&mut self, ids: &[ItemId]) -> Result<usize> {
        self.capture(ids, true)
    }

    fn capture(&mut self, ids: &[ItemId], is_cut: bool) -> Result<usize> {
        if ids.is_empty() {
            return Err(PlanningError::validation("Nothing selected."));
        }
        if let Some(&id) = ids.iter().find(|&&id| self.item(id).is_none()) {
            return Err(PlanningError::ItemNotFound { id });
        }
        let count = self.clipboard.copy(ids, &self.items, is_cut);
        if count == 0 {
            return Err(PlanningError::validation("Nothing selected."));
        }
        Ok(count)
    }

    /// Pastes the clipboard under `target_id` (`None` for root level).
    ///
    /// Pasted items are appended after the target's existing children. A cut
    /// deletes the originals after the copies are created and empties the
    /// clipboard; if the originals cannot be deleted the copies are removed
    /// again and the clipboard is kept.
    pub async fn paste(&mut self, target_id: Option<ItemId>) -> Result<PasteOutcome> {
        let target = target_id.map(|id| self.require(id)).transpose()?;
        let validation = self.clipboard.validate_paste(target);
        if !validation.valid {
            return Err(PlanningError::validation(
                validation
                    .error
                    .unwrap_or_else(|| "Cannot paste here.".to_string()),
            ));
        }

        let insert_order_start = self
            .tree()
            .children(target_id)
            .iter()
            .map(|sibling| sibling.sort_order)
            .max()
            .map_or(1, |max| max + 1);
        let prepared = self
            .clipboard
            .prepare_for_paste(self.project_id, target, insert_order_start)
            .ok_or_else(|| PlanningError::validation("Nothing to paste."))?;

        let is_cut = self.clipboard.is_cut_operation();
        let cut_ids: Vec<ItemId> = if is_cut {
            self.clipboard
                .source_ids()
                .into_iter()
                .filter(|id| self.item(*id).is_some())
                .collect()
        } else {
            Vec::new()
        };

        let result = self.store.create_batch(self.project_id, prepared).await;
        let created = self.persisted("Paste", result).await?;
        if !cut_ids.is_empty() {
            if let Err(err) = self.store.soft_delete_batch(&cut_ids).await {
                // The cut stays on the clipboard, so the copies go too.
                let copies: Vec<ItemId> = created.iter().map(|item| item.id).collect();
                if let Err(cleanup_err) = self.store.soft_delete_batch(&copies).await {
                    log::warn!("Removing pasted copies failed: {cleanup_err}");
                }
                return Err(self.reconcile("Paste (removing cut items)", err).await);
            }
        }
        if is_cut {
            self.clipboard.clear();
        }
        log::debug!(
            "Pasted {} items ({} cut originals removed)",
            created.len(),
            cut_ids.len()
        );

        self.history.push(HistoryAction::Paste {
            created_ids: created.iter().map(|item| item.id).collect(),
            cut_ids: cut_ids.clone(),
        });
        self.settle().await?;
        Ok(PasteOutcome {
            created: created
                .into_iter()
                .map(|item| self.refetched(item))
                .collect(),
            cut_ids,
        })
    }
}
