//! Command-line argument wrappers using clap
//!
//! These types implement the CLI side of the parameter wrapper pattern:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner
//! ```
//!
//! Core parameter types stay free of clap derives. Arguments that only carry
//! plain values convert with `From`; arguments that name items convert with
//! `into_params`, which resolves outline numbers and ID prefixes against the
//! current snapshot first.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use trellis_core::{
    models::{ItemStatus, ItemType},
    params::{CreateItem, DropItems, UpdateItem},
    DropPosition, LinkStrategy,
};

use crate::item_ref::ItemRefs;

// ============================================================================
// Projects
// ============================================================================

/// Create a new project
#[derive(Args)]
pub struct CreateProjectArgs {
    /// Name of the project
    pub name: String,
    #[arg(short, long, help = "Optional description of the project")]
    pub description: Option<String>,
}

/// Show details of a project
#[derive(Args)]
pub struct ShowProjectArgs {
    #[arg(help = "Project ID; defaults to the current project")]
    pub id: Option<u64>,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    #[command(alias = "c")]
    Create(CreateProjectArgs),
    /// List all projects
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a project
    #[command(alias = "s")]
    Show(ShowProjectArgs),
}

// ============================================================================
// Items
// ============================================================================

/// Add an item to the current project
///
/// The type follows from the parent unless given: milestones at root,
/// deliverables under milestones, tasks under deliverables and tasks.
#[derive(Args)]
pub struct AddItemArgs {
    /// Name of the item
    pub name: String,
    #[arg(long, help = "Parent item (outline number or ID prefix); root when omitted")]
    pub parent: Option<String>,
    #[arg(short = 't', long = "type", help = "Item type, when not derived from the parent")]
    pub item_type: Option<ItemTypeArg>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub status: Option<ItemStatusArg>,
    #[arg(long, help = "Planned start (YYYY-MM-DD)")]
    pub start: Option<String>,
    #[arg(long, help = "Planned end (YYYY-MM-DD)")]
    pub end: Option<String>,
    #[arg(long, help = "Duration in days")]
    pub duration: Option<u32>,
}

impl AddItemArgs {
    pub fn into_params(self, refs: &ItemRefs<'_>) -> Result<CreateItem> {
        Ok(CreateItem {
            parent_id: refs.resolve_optional(self.parent.as_deref())?,
            item_type: self.item_type.map(Into::into),
            name: self.name,
            description: self.description,
            status: self.status.map(|s| s.to_string()),
            start_date: self.start,
            end_date: self.end,
            duration_days: self.duration,
        })
    }
}

/// Update an item's details
///
/// Pass an empty string to clear a text or date field.
#[derive(Args)]
pub struct UpdateItemArgs {
    #[arg(help = "Item to update (outline number or ID prefix)")]
    pub item: String,
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long)]
    pub status: Option<ItemStatusArg>,
    #[arg(short, long, help = "Completion percentage (0-100)")]
    pub progress: Option<u8>,
    #[arg(long, help = "Planned start (YYYY-MM-DD)")]
    pub start: Option<String>,
    #[arg(long, help = "Planned end (YYYY-MM-DD)")]
    pub end: Option<String>,
    #[arg(long, help = "Duration in days")]
    pub duration: Option<u32>,
    #[arg(long, help = "Linked estimate component")]
    pub estimate: Option<String>,
}

impl UpdateItemArgs {
    pub fn into_params(self, refs: &ItemRefs<'_>) -> Result<UpdateItem> {
        Ok(UpdateItem {
            id: refs.resolve(&self.item)?,
            name: self.name,
            description: self.description,
            status: self.status.map(|s| s.to_string()),
            progress: self.progress,
            start_date: self.start,
            end_date: self.end,
            duration_days: self.duration,
            estimate_component_id: self.estimate,
        })
    }
}

/// One item reference
#[derive(Args)]
pub struct ItemRefArgs {
    #[arg(help = "Item (outline number or ID prefix)")]
    pub item: String,
}

/// Several item references
#[derive(Args)]
pub struct ItemsArgs {
    #[arg(required = true, num_args = 1.., help = "Items (outline numbers or ID prefixes)")]
    pub items: Vec<String>,
}

/// Move an item under a new parent
#[derive(Args)]
pub struct MoveItemArgs {
    #[arg(help = "Item to move")]
    pub item: String,
    #[arg(long, help = "New parent; root level when omitted")]
    pub parent: Option<String>,
    #[arg(long, help = "0-based position among the new siblings; last when omitted")]
    pub position: Option<usize>,
}

/// Drop a selection before, after or inside a target item
#[derive(Args)]
pub struct DropItemsArgs {
    #[arg(required = true, num_args = 1.., help = "Items to drag")]
    pub items: Vec<String>,
    #[arg(long, help = "Item the selection is dropped on")]
    pub onto: String,
    #[arg(long, value_enum, default_value_t = DropPositionArg::Inside)]
    pub position: DropPositionArg,
}

impl DropItemsArgs {
    pub fn into_params(self, refs: &ItemRefs<'_>) -> Result<DropItems> {
        Ok(DropItems {
            selection: refs.resolve_all(&self.items)?,
            target_id: refs.resolve(&self.onto)?,
            position: self.position.into(),
        })
    }
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item
    #[command(alias = "a")]
    Add(AddItemArgs),
    /// Update an item's details
    #[command(alias = "u")]
    Update(UpdateItemArgs),
    /// Show details of an item
    #[command(alias = "s")]
    Show(ItemRefArgs),
    /// Delete items together with everything below them
    #[command(aliases = ["d", "rm"])]
    Delete(ItemsArgs),
    /// Move an item under a new parent
    #[command(alias = "mv")]
    Move(MoveItemArgs),
    /// Move an item one level up
    Promote(ItemRefArgs),
    /// Move an item under its previous sibling
    Demote(ItemRefArgs),
    /// Drop a selection before, after or inside a target
    Drop(DropItemsArgs),
}

// ============================================================================
// Tree, links and import
// ============================================================================

/// Show the project outline
#[derive(Args, Default)]
pub struct TreeArgs {
    #[arg(long, num_args = 1.., help = "Items whose children are hidden")]
    pub collapse: Vec<String>,
}

/// Link or unlink dependencies across a selection
///
/// The selection is ordered by outline position regardless of the order
/// given on the command line.
#[derive(Args)]
pub struct LinkArgs {
    #[arg(value_enum)]
    pub strategy: LinkStrategyArg,
    #[arg(required = true, num_args = 1.., help = "Items (outline numbers or ID prefixes)")]
    pub items: Vec<String>,
}

/// Import a nested outline from a JSON file
#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of nodes
    pub file: PathBuf,
    #[arg(long, help = "Parent of the imported roots; root level when omitted")]
    pub parent: Option<String>,
}

// ============================================================================
// Value enums
// ============================================================================

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ItemTypeArg {
    Component,
    Milestone,
    Deliverable,
    Task,
}

impl From<ItemTypeArg> for ItemType {
    fn from(val: ItemTypeArg) -> Self {
        match val {
            ItemTypeArg::Component => ItemType::Component,
            ItemTypeArg::Milestone => ItemType::Milestone,
            ItemTypeArg::Deliverable => ItemType::Deliverable,
            ItemTypeArg::Task => ItemType::Task,
        }
    }
}

/// Command-line representation of item status values
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ItemStatusArg {
    #[value(alias = "todo")]
    NotStarted,
    InProgress,
    #[value(alias = "done")]
    Completed,
    OnHold,
    Cancelled,
}

impl std::fmt::Display for ItemStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ItemStatusArg::NotStarted => ItemStatus::NotStarted,
            ItemStatusArg::InProgress => ItemStatus::InProgress,
            ItemStatusArg::Completed => ItemStatus::Completed,
            ItemStatusArg::OnHold => ItemStatus::OnHold,
            ItemStatusArg::Cancelled => ItemStatus::Cancelled,
        };
        write!(f, "{}", status.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum DropPositionArg {
    Before,
    After,
    Inside,
}

impl From<DropPositionArg> for DropPosition {
    fn from(val: DropPositionArg) -> Self {
        match val {
            DropPositionArg::Before => DropPosition::Before,
            DropPositionArg::After => DropPosition::After,
            DropPositionArg::Inside => DropPosition::Inside,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LinkStrategyArg {
    /// Each item depends on the one before it
    Chain,
    /// The last item depends on all others
    FanIn,
    /// All others depend on the first item
    FanOut,
    /// Remove dependencies among the selected items
    Unlink,
    /// Remove every dependency of the selected items
    Clear,
}

impl From<LinkStrategyArg> for LinkStrategy {
    fn from(val: LinkStrategyArg) -> Self {
        match val {
            LinkStrategyArg::Chain => LinkStrategy::Chain,
            LinkStrategyArg::FanIn => LinkStrategy::FanIn,
            LinkStrategyArg::FanOut => LinkStrategy::FanOut,
            LinkStrategyArg::Unlink => LinkStrategy::UnlinkSelected,
            LinkStrategyArg::Clear => LinkStrategy::ClearPredecessors,
        }
    }
}
