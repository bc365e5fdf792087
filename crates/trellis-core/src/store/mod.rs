//! Persistence collaborators for the planner.
//!
//! The planner only ever talks to a [`PlanStore`]. Two implementations ship
//! with the crate:
//!
//! - [`SqliteStore`]: the durable store used by the CLI, one SQLite file
//! - [`MemoryStore`]: an in-process store for tests and embedding, with
//!   write-failure injection
//!
//! Both number the outline with [`wbs::compute_wbs`] when asked to
//! [`PlanStore::recalculate_wbs`]; the planner never writes `wbs` itself.

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{ItemId, ItemPatch, NewPlanItem, PlanItem},
};

pub mod memory;
pub mod sqlite;
pub mod wbs;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Abstract persistence of plan items.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// All non-deleted items of a project.
    async fn fetch_all(&self, project_id: u64) -> Result<Vec<PlanItem>>;

    /// Inserts one item, assigning its identifier and, when absent, a
    /// `sort_order` after its last sibling.
    async fn create_item(&self, item: NewPlanItem) -> Result<PlanItem>;

    /// Inserts prepared items in the given order, which must list parents
    /// before their children.
    async fn create_batch(&self, project_id: u64, items: Vec<PlanItem>) -> Result<Vec<PlanItem>>;

    /// Applies a partial update and returns the stored item.
    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<PlanItem>;

    /// Marks items as deleted.
    async fn soft_delete_batch(&self, ids: &[ItemId]) -> Result<()>;

    /// Recomputes the dotted outline numbers of a project.
    async fn recalculate_wbs(&self, project_id: u64) -> Result<()>;

    /// Clears the deleted flag of previously soft-deleted items.
    async fn restore(&self, ids: &[ItemId]) -> Result<()>;
}
