//! Editing session over one project's work breakdown structure.
//!
//! A [`Planner`] owns everything a single user session needs: the
//! persistence collaborator, a snapshot of the project's items, one
//! [`Clipboard`] and one [`History`]. Nothing is process-wide, so two
//! sessions are simply two planners.
//!
//! Every gesture follows the same sequence:
//!
//! ```text
//! validate ──▶ persist ──▶ record history ──▶ recalculate WBS ──▶ re-fetch
//!    │            │
//!    │            └─ failure: log, re-fetch, return the error (no history)
//!    └─ failure: return the error (no store call)
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: configures a planner over SQLite or any [`PlanStore`]
//! - [`item_ops`]: create, update, delete and batch import
//! - [`structure_ops`]: move, promote, demote and drag-and-drop
//! - [`clipboard_ops`]: copy, cut and paste
//! - [`link_ops`]: bulk dependency linking
//! - [`history_ops`]: undo and redo
//!
//! # Usage Examples
//!
//! ```rust
//! use trellis_core::{params::CreateItem, store::MemoryStore, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut planner = PlannerBuilder::new(1)
//!     .build_with_store(MemoryStore::new())
//!     .await?;
//!
//! let milestone = planner
//!     .create_item(&CreateItem {
//!         name: "Design approved".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! assert_eq!(milestone.wbs.as_deref(), Some("1"));
//!
//! planner.undo().await?;
//! assert!(planner.items().is_empty());
//! # Ok(())
//! # }
//! ```

use tokio::sync::watch;

use crate::{
    clipboard::Clipboard,
    error::{PlanningError, Result},
    history::{History, HistoryState},
    models::{ItemId, ItemPatch, PlanItem, PlacementChange},
    store::PlanStore,
    tree::TreeIndex,
};

pub mod builder;
pub mod clipboard_ops;
pub mod history_ops;
pub mod item_ops;
pub mod link_ops;
pub mod structure_ops;


pub use builder::PlannerBuilder;
pub use clipboard_ops::PasteOutcome;

/// One editing session over a project.
pub struct Planner<S: PlanStore> {
    store: S,
    project_id: u64,
    items: Vec<PlanItem>,
    clipboard: Clipboard,
    history: History,
}

impl<S: PlanStore> Planner<S> {
    pub(crate) fn new(store: S, project_id: u64, history: History) -> Self {
        Self {
            store,
            project_id,
            items: Vec::new(),
            clipboard: Clipboard::new(),
            history,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// The last fetched, non-deleted items of the project.
    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PlanItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Index over the current snapshot.
    pub fn tree(&self) -> TreeIndex<'_> {
        TreeIndex::new(&self.items)
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    /// Receiver notified on every history change.
    pub fn subscribe_history(&self) -> watch::Receiver<HistoryState> {
        self.history.subscribe()
    }

    /// Replaces the snapshot with the store's current items.
    pub async fn refresh(&mut self) -> Result<()> {
        self.items = self.store.fetch_all(self.project_id).await?;
        Ok(())
    }

    fn require(&self, id: ItemId) -> Result<&PlanItem> {
        self.item(id).ok_or(PlanningError::ItemNotFound { id })
    }

    /// Passes a successful store result through; on failure logs, re-fetches
    /// and hands the error back.
    async fn persisted<T>(&mut self, gesture: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.reconcile(gesture, err).await),
        }
    }

    async fn reconcile(&mut self, gesture: &str, err: PlanningError) -> PlanningError {
        log::warn!("{gesture} failed: {err}");
        if let Err(refresh_err) = self.refresh().await {
            log::warn!("Re-fetch after failed {gesture} also failed: {refresh_err}");
        }
        err
    }

    /// Recomputes outline numbers and re-fetches after a successful gesture.
    async fn settle(&mut self) -> Result<()> {
        if let Err(err) = self.store.recalculate_wbs(self.project_id).await {
            log::warn!("WBS recalculation failed: {err}");
        }
        self.refresh().await
    }

    /// Writes one side of each placement change. On the first failure the
    /// changes already written are put back, newest first.
    async fn write_placements(&self, changes: &[PlacementChange], forward: bool) -> Result<()> {
        for (written, change) in changes.iter().enumerate() {
            let placement = if forward { change.after } else { change.before };
            if let Err(err) = self
                .store
                .update_item(change.id, ItemPatch::placement(&placement))
                .await
            {
                self.roll_back_placements(&changes[..written], forward)
                    .await;
                return Err(err);
            }
        }
        Ok(())
    }

    async fn roll_back_placements(&self, written: &[PlacementChange], forward: bool) {
        for change in written.iter().rev() {
            let placement = if forward { change.before } else { change.after };
            if let Err(err) = self
                .store
                .update_item(change.id, ItemPatch::placement(&placement))
                .await
            {
                log::warn!("Rolling back placement of {} failed: {err}", change.id);
            }
        }
    }

    fn refetched(&self, item: PlanItem) -> PlanItem {
        self.item(item.id).cloned().unwrap_or(item)
    }
}
