//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly; collections and
//! operation outcomes get newtype wrappers so the same data can be shown
//! differently per context (an outline row vs. a full item section).
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │    Wrappers     │    │    Markdown     │
//! │ (Item, Project) │───▶│ (Outline, ...)  │───▶│     Output      │
//! │                 │    │ & Result Types  │    │   (Terminal)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Projects, Items, Outline and HistoryEntries
//! - [`results`]: CreateResult, UpdateResult, DeleteResult, plus Display for
//!   paste and link outcomes
//! - [`status`]: OperationStatus confirmations
//! - [`datetime`]: timestamp and date-range formatting
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use std::collections::HashSet;
//!
//! use trellis_core::{
//!     display::{OperationStatus, Outline},
//!     models::{ItemType, PlanItem},
//!     tree::TreeIndex,
//! };
//!
//! let items = vec![PlanItem::new(1, ItemType::Milestone, "Kickoff")];
//! let tree = TreeIndex::new(&items);
//! let outline = Outline(tree.visible_rows(&HashSet::new())).to_string();
//! assert!(outline.contains("◇ Kickoff"));
//!
//! let status = OperationStatus::success("Undid Create");
//! assert_eq!(status.to_string(), "Success: Undid Create\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{HistoryEntries, Items, Outline, Projects};
pub use datetime::{DateRange, LocalDateTime};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
