//! Predecessor dependencies between plan items.
//!
//! - [`cycle`]: detects whether a proposed edge would close a loop
//! - [`linker`]: bulk linking strategies applied to a selection

pub mod cycle;
pub mod linker;

pub use cycle::CycleDetector;
pub use linker::{plan_links, LinkPlan, LinkStrategy, LinkSummary, PredecessorChange, SkippedLink};
