//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper renders its own empty case, so callers can print them
//! without checking length first.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    history::HistoryEntry,
    models::{PlanItem, Project},
    tree::VisibleRow,
};

/// Newtype wrapper for displaying a list of projects.
///
/// # Examples
///
/// ```rust
/// use jiff::Timestamp;
/// use trellis_core::{display::Projects, models::Project};
///
/// let project = Project {
///     id: 1,
///     name: "Office move".to_string(),
///     description: None,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
/// let output = Projects(vec![project]).to_string();
/// assert!(output.contains("Office move (ID: 1)"));
/// ```
pub struct Projects(pub Vec<Project>);

impl Projects {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Projects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No projects found.");
        }
        for project in &self.0 {
            writeln!(f, "## {} (ID: {})", project.name, project.id)?;
            writeln!(f)?;
            if let Some(desc) = &project.description {
                writeln!(f, "- **Description**: {desc}")?;
            }
            writeln!(f, "- **Created**: {}", LocalDateTime(&project.created_at))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Full details of several items, one section each.
pub struct Items(pub Vec<PlanItem>);

impl fmt::Display for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No items found.");
        }
        for item in &self.0 {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

/// The visible rows of a project tree as a nested markdown list.
///
/// Each row shows its outline number, type marker, name, status and
/// progress. Collapsed rows note how many children they hide.
pub struct Outline<'a>(pub Vec<VisibleRow<'a>>);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No items in this project.");
        }
        for row in &self.0 {
            let item = row.item;
            let indent = "  ".repeat(item.indent_level as usize);
            write!(f, "{indent}- ")?;
            if let Some(wbs) = &item.wbs {
                write!(f, "**{wbs}** ")?;
            }
            write!(
                f,
                "{} {} · {} · {}%",
                item.item_type.marker(),
                item.name,
                item.status.with_icon(),
                item.progress
            )?;
            if !item.predecessors.is_empty() {
                write!(f, " · {} deps", item.predecessors.len())?;
            }
            if row.collapsed && row.children_count > 0 {
                write!(f, " *(+{} hidden)*", row.children_count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Undo stack listing, most recent first.
pub struct HistoryEntries<'a>(pub Vec<&'a HistoryEntry>);

impl fmt::Display for HistoryEntries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "Nothing to undo.");
        }
        for (n, entry) in self.0.iter().rev().enumerate() {
            writeln!(
                f,
                "{}. {} ({})",
                n + 1,
                entry.action.label(),
                LocalDateTime(&entry.timestamp)
            )?;
        }
        Ok(())
    }
}
