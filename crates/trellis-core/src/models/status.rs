//! Enumerations for item types, item statuses and dependency types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Level of an item in the work breakdown structure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Top-level grouping, only ever at root
    Component,
    /// Milestone, at root or under a component
    Milestone,
    /// Deliverable under a milestone
    Deliverable,
    /// Unit of work under a deliverable or another task
    Task,
}

impl ItemType {
    /// Every item type, outermost level first.
    pub const ALL: [ItemType; 4] = [
        ItemType::Component,
        ItemType::Milestone,
        ItemType::Deliverable,
        ItemType::Task,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Component => "component",
            ItemType::Milestone => "milestone",
            ItemType::Deliverable => "deliverable",
            ItemType::Task => "task",
        }
    }

    /// Single character marker used in outlines.
    pub fn marker(&self) -> &'static str {
        match self {
            ItemType::Component => "◆",
            ItemType::Milestone => "◇",
            ItemType::Deliverable => "■",
            ItemType::Task => "·",
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "component" => Ok(ItemType::Component),
            "milestone" => Ok(ItemType::Milestone),
            "deliverable" => Ok(ItemType::Deliverable),
            "task" => Ok(ItemType::Task),
            _ => Err(format!("Invalid item type: {s}")),
        }
    }
}

/// Progress status of a plan item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "not_started" | "notstarted" | "todo" => Ok(ItemStatus::NotStarted),
            "in_progress" | "inprogress" => Ok(ItemStatus::InProgress),
            "completed" | "done" => Ok(ItemStatus::Completed),
            "on_hold" | "onhold" => Ok(ItemStatus::OnHold),
            "cancelled" | "canceled" => Ok(ItemStatus::Cancelled),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

impl ItemStatus {
    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
            ItemStatus::OnHold => "on_hold",
            ItemStatus::Cancelled => "cancelled",
        }
    }

    /// Get status with consistent icon formatting for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "○ Not started",
            ItemStatus::InProgress => "➤ In progress",
            ItemStatus::Completed => "✓ Completed",
            ItemStatus::OnHold => "‖ On hold",
            ItemStatus::Cancelled => "✗ Cancelled",
        }
    }
}

/// Scheduling relationship of a predecessor edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DependencyType {
    /// Finish-to-start
    #[default]
    FS,
    /// Start-to-start
    SS,
    /// Finish-to-finish
    FF,
    /// Start-to-finish
    SF,
}

impl DependencyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FS => "FS",
            DependencyType::SS => "SS",
            DependencyType::FF => "FF",
            DependencyType::SF => "SF",
        }
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FS" => Ok(DependencyType::FS),
            "SS" => Ok(DependencyType::SS),
            "FF" => Ok(DependencyType::FF),
            "SF" => Ok(DependencyType::SF),
            _ => Err(format!("Invalid dependency type: {s}")),
        }
    }
}
