//! Result wrapper types for displaying operation outcomes.
//!
//! This module provides wrapper types that format the results of create,
//! update and delete operations, plus Display for the outcomes of the bulk
//! operations (paste, linking).

use std::fmt;

use crate::{
    dependencies::LinkSummary,
    models::{PlanItem, Project},
    planner::PasteOutcome,
};

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use trellis_core::{
///     display::CreateResult,
///     models::{ItemType, PlanItem},
/// };
///
/// let mut item = PlanItem::new(1, ItemType::Milestone, "Go live");
/// item.wbs = Some("3".to_string());
///
/// let output = CreateResult::new(item).to_string();
/// assert!(output.starts_with("Created milestone 3"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    /// Create a new CreateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Project> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created project with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<PlanItem> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Created {}", self.resource.item_type)?;
        if let Some(wbs) = &self.resource.wbs {
            write!(f, " {wbs}")?;
        }
        writeln!(f)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations.
///
/// The wrapper can list the fields that changed, giving users clear
/// feedback about what was modified.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    /// Create a new UpdateResult wrapper.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    /// Create an UpdateResult with a list of changes made.
    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }
}

impl fmt::Display for UpdateResult<PlanItem> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated {} '{}'", self.resource.item_type, self.resource.name)?;

        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
///
/// `cascaded` counts the descendants removed along with the resource.
pub struct DeleteResult<T> {
    pub resource: T,
    pub cascaded: usize,
}

impl<T> DeleteResult<T> {
    /// Create a new DeleteResult wrapper.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            cascaded: 0,
        }
    }

    pub fn with_cascaded(resource: T, cascaded: usize) -> Self {
        Self { resource, cascaded }
    }
}

impl fmt::Display for DeleteResult<PlanItem> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deleted {} '{}'",
            self.resource.item_type, self.resource.name
        )?;
        match self.cascaded {
            0 => writeln!(f),
            1 => writeln!(f, " and 1 item below it"),
            n => writeln!(f, " and {n} items below it"),
        }
    }
}

impl fmt::Display for PasteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.created.len();
        write!(f, "Pasted {count} {}", if count == 1 { "item" } else { "items" })?;
        if !self.cut_ids.is_empty() {
            write!(f, " (moved from the cut selection)")?;
        }
        writeln!(f)?;
        for item in &self.created {
            let indent = "  ".repeat(item.indent_level as usize);
            match &item.wbs {
                Some(wbs) => writeln!(f, "{indent}- **{wbs}** {}", item.name)?,
                None => writeln!(f, "{indent}- {}", item.name)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for LinkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message())?;
        for skipped in &self.cycles {
            writeln!(
                f,
                "- Skipped: {} → {} would create a circular dependency",
                skipped.predecessor, skipped.successor
            )?;
        }
        for (id, reason) in &self.failures {
            writeln!(f, "- Failed: {id}: {reason}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dependencies::SkippedLink, models::ItemType};

    #[test]
    fn test_delete_result_display() {
        let item = PlanItem::new(1, ItemType::Milestone, "Launch");
        assert_eq!(
            DeleteResult::new(item.clone()).to_string(),
            "Deleted milestone 'Launch'\n"
        );
        assert_eq!(
            DeleteResult::with_cascaded(item, 3).to_string(),
            "Deleted milestone 'Launch' and 3 items below it\n"
        );
    }

    #[test]
    fn test_update_result_lists_changes() {
        let item = PlanItem::new(1, ItemType::Task, "Paint");
        let output =
            UpdateResult::with_changes(item, vec!["name".to_string(), "progress".to_string()])
                .to_string();
        assert!(output.starts_with("Updated task 'Paint'\n"));
        assert!(output.contains("Changes made:\n- name\n- progress\n"));
    }

    #[test]
    fn test_paste_outcome_display() {
        let mut root = PlanItem::new(1, ItemType::Milestone, "Launch (Copy)");
        root.wbs = Some("2".to_string());
        let mut child = PlanItem::new(1, ItemType::Deliverable, "Website");
        child.indent_level = 1;
        child.wbs = Some("2.1".to_string());

        let outcome = PasteOutcome {
            created: vec![root, child],
            cut_ids: vec![],
        };
        assert_eq!(
            outcome.to_string(),
            "Pasted 2 items\n- **2** Launch (Copy)\n  - **2.1** Website\n"
        );
    }

    #[test]
    fn test_link_summary_display() {
        let a = PlanItem::new(1, ItemType::Task, "A");
        let b = PlanItem::new(1, ItemType::Task, "B");
        let summary = LinkSummary {
            linked: 1,
            cycles: vec![SkippedLink {
                successor: a.id,
                predecessor: b.id,
            }],
            ..Default::default()
        };
        let output = summary.to_string();
        assert!(output.starts_with(
            "Linked 1 dependency, 1 skipped (would create a circular dependency)\n"
        ));
        assert!(output.contains(&format!("- Skipped: {} → {}", b.id, a.id)));
    }
}
