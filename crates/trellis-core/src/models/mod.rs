//! Data models for projects and plan items.
//!
//! The central type is [`PlanItem`], one node of a project's work breakdown
//! structure. Structural changes are described by [`Placement`] values and
//! partial updates by [`ItemPatch`], which is the only shape a persistence
//! collaborator ever receives for an update. Display implementations live in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use trellis_core::models::{ItemPatch, ItemStatus, ItemType, PlanItem};
//!
//! let mut item = PlanItem::new(1, ItemType::Milestone, "Design approved");
//! let patch = ItemPatch {
//!     status: Some(ItemStatus::InProgress),
//!     progress: Some(40),
//!     ..Default::default()
//! };
//!
//! let previous = patch.capture_previous(&item);
//! item.apply_patch(&patch);
//! assert_eq!(item.progress, 40);
//!
//! item.apply_patch(&previous);
//! assert_eq!(item.status, ItemStatus::NotStarted);
//! ```

pub mod item;
pub mod project;
pub mod status;


pub use item::{
    ItemId, ItemPatch, NewPlanItem, PlanItem, Placement, PlacementChange, Predecessor,
};
pub use project::Project;
pub use status::{DependencyType, ItemStatus, ItemType};
