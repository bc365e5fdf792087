//! Bulk dependency linking for the Planner.

use super::Planner;
use crate::{
    dependencies::{plan_links, LinkStrategy, LinkSummary, PredecessorChange},
    error::Result,
    history::HistoryAction,
    models::{ItemId, ItemPatch},
    store::PlanStore,
};

impl<S: PlanStore> Planner<S> {
    /// Links (or unlinks) the selection with `strategy`.
    ///
    /// Writes are issued one item at a time. A failed write is reported in
    /// the summary and the batch carries on; the history entry covers only
    /// the writes that went through.
    pub async fn link(
        &mut self,
        strategy: LinkStrategy,
        selection: &[ItemId],
    ) -> Result<LinkSummary> {
        let plan = plan_links(&self.items, strategy, selection)?;
        let mut summary = LinkSummary {
            already_linked: plan.already_linked,
            cycles: plan.cycles.clone(),
            ..Default::default()
        };
        if plan.changes.is_empty() {
            return Ok(summary);
        }

        let mut written: Vec<PredecessorChange> = Vec::with_capacity(plan.changes.len());
        for change in plan.changes {
            let patch = ItemPatch::predecessors(change.new.clone());
            match self.store.update_item(change.id, patch).await {
                Ok(_) => written.push(change),
                Err(err) => {
                    log::warn!("Linking {} failed: {err}", change.id);
                    summary.failures.push((change.id, err.to_string()));
                }
            }
        }

        for change in &written {
            summary.linked += change
                .new
                .iter()
                .filter(|p| !change.previous.iter().any(|q| q.id == p.id))
                .count();
            summary.removed += change
                .previous
                .iter()
                .filter(|p| !change.new.iter().any(|q| q.id == p.id))
                .count();
        }
        summary.items_changed = written.len();
        log::debug!("{:?} link: {}", strategy, summary.message());

        if !written.is_empty() {
            self.history.push(HistoryAction::Link { changes: written });
        }
        self.settle().await?;
        Ok(summary)
    }
}
