//! Core library for the Trellis project planner.
//!
//! Trellis keeps a project's work breakdown structure as a strict hierarchy
//! (components, milestones, deliverables, tasks) with predecessor
//! dependencies between items. This crate holds the rules and the editing
//! engine; persistence sits behind the [`store::PlanStore`] trait.
//!
//! # Layers
//!
//! - **Rules** ([`hierarchy`], [`tree`], [`dependencies`]): pure functions
//!   over item snapshots
//! - **Planning** ([`mutator`], [`clipboard`], [`history`]): compute
//!   placements, copies and undo records without touching storage
//! - **Session** ([`planner`]): validates, persists, records history and
//!   re-fetches for every gesture
//! - **Storage** ([`store`], [`db`]): SQLite via rusqlite, or an in-memory
//!   store for tests
//! - **Output** ([`display`]): markdown rendering for the CLI
//!
//! # Quick Start
//!
//! ```rust
//! use trellis_core::{params::CreateItem, store::SqliteStore, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("trellis.db").await?;
//! let project = store.create_project("Office move", None).await?;
//!
//! let mut planner = PlannerBuilder::new(project.id)
//!     .with_database_path(Some("trellis.db"))
//!     .build()
//!     .await?;
//!
//! let milestone = planner
//!     .create_item(&CreateItem {
//!         name: "Lease signed".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{milestone}");
//! # Ok(())
//! # }
//! ```

pub mod clipboard;
pub mod db;
pub mod dependencies;
pub mod display;
pub mod error;
pub mod hierarchy;
pub mod history;
pub mod models;
pub mod mutator;
pub mod params;
pub mod planner;
pub mod store;
pub mod tree;

// Re-export commonly used types
pub use clipboard::Clipboard;
pub use db::Database;
pub use dependencies::{CycleDetector, LinkStrategy, LinkSummary};
pub use display::{CreateResult, DeleteResult, OperationStatus, Outline, UpdateResult};
pub use error::{PlanningError, Result};
pub use history::{History, HistoryAction, HistoryState};
pub use models::{ItemId, ItemStatus, ItemType, PlanItem, Project};
pub use mutator::DropPosition;
pub use planner::{PasteOutcome, Planner, PlannerBuilder};
pub use store::{MemoryStore, PlanStore, SqliteStore};
pub use tree::TreeIndex;
