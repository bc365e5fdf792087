//! Parameter structures for Trellis operations
//!
//! Interface-neutral inputs for the [`crate::planner::Planner`]. Front ends
//! (the CLI today) define their own framework-specific argument types and
//! convert into these with `From`, keeping clap out of the core:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │───▶│  Core Params    │───▶│    Planner      │
//! │  (clap derives) │    │ (serde derives) │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Free-form values (statuses, dates) arrive as strings and are validated
//! here, so every interface reports the same errors.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PlanningError, Result},
    models::{ItemId, ItemPatch, ItemStatus, ItemType},
    mutator::DropPosition,
};

/// Parameters for creating a single item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateItem {
    /// Parent item, `None` for root level
    pub parent_id: Option<ItemId>,
    /// Item type; derived from the parent when absent
    pub item_type: Option<ItemType>,
    /// Name of the item (required)
    pub name: String,
    pub description: Option<String>,
    /// Initial status ('not_started', 'in_progress', ...)
    pub status: Option<String>,
    /// Planned start, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Planned end, `YYYY-MM-DD`
    pub end_date: Option<String>,
    pub duration_days: Option<u32>,
}

impl CreateItem {
    /// Parses status and dates.
    pub fn parsed_status(&self) -> Result<ItemStatus> {
        parse_status(self.status.as_deref()).map(Option::unwrap_or_default)
    }

    pub fn parsed_dates(&self) -> Result<(Option<Date>, Option<Date>)> {
        let start = parse_date("start_date", self.start_date.as_deref())?;
        let end = parse_date("end_date", self.end_date.as_deref())?;
        check_date_order(start, end)?;
        if self.duration_days == Some(0) {
            return Err(PlanningError::invalid_input("duration_days").with_reason("must be positive"));
        }
        Ok((start, end))
    }
}

/// Parameters for updating an existing item.
///
/// Only the fields that are set are written. An empty string clears a
/// nullable text or date field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    /// Item ID to update (required)
    pub id: ItemId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    /// Completion percentage, 0 to 100
    pub progress: Option<u8>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration_days: Option<u32>,
    pub estimate_component_id: Option<String>,
}

impl UpdateItem {
    /// Validates the parameters and converts them to a patch.
    ///
    /// # Errors
    ///
    /// * `PlanningError::InvalidInput` - invalid status, date, progress above
    ///   100, zero duration, or an empty name
    pub fn to_patch(&self) -> Result<ItemPatch> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(PlanningError::invalid_input("name").with_reason("cannot be empty"));
            }
        }
        if let Some(progress) = self.progress {
            if progress > 100 {
                return Err(PlanningError::invalid_input("progress")
                    .with_reason(format!("{progress} is not between 0 and 100")));
            }
        }
        if self.duration_days == Some(0) {
            return Err(PlanningError::invalid_input("duration_days").with_reason("must be positive"));
        }

        let start_date = self
            .start_date
            .as_deref()
            .map(|s| parse_date("start_date", non_empty(s)))
            .transpose()?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|s| parse_date("end_date", non_empty(s)))
            .transpose()?;
        check_date_order(start_date.flatten(), end_date.flatten())?;

        Ok(ItemPatch {
            name: self.name.clone(),
            description: self
                .description
                .as_deref()
                .map(|s| non_empty(s).map(String::from)),
            status: parse_status(self.status.as_deref())?,
            progress: self.progress,
            start_date,
            end_date,
            duration_days: self.duration_days.map(Some),
            estimate_component_id: self
                .estimate_component_id
                .as_deref()
                .map(|s| non_empty(s).map(String::from)),
            ..Default::default()
        })
    }
}

/// Parameters for moving one item under a new parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveItem {
    pub id: ItemId,
    /// New parent, `None` for root level
    pub parent_id: Option<ItemId>,
    /// Requested position among the new siblings
    pub sort_order: i64,
}

/// Parameters for dropping a selection onto a target item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropItems {
    pub selection: Vec<ItemId>,
    pub target_id: ItemId,
    pub position: DropPosition,
}

/// One node of a nested import outline.
///
/// ```json
/// {"name": "Launch", "children": [{"name": "Beta", "type": "deliverable"}]}
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportNode {
    pub name: String,
    /// Item type; derived from the parent when absent
    #[serde(rename = "type", default)]
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub children: Vec<ImportNode>,
}

impl ImportNode {
    /// Checks this node's own fields; nesting is checked by the importer.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlanningError::invalid_input("name").with_reason("cannot be empty"));
        }
        if self.progress.is_some_and(|progress| progress > 100) {
            return Err(PlanningError::invalid_input("progress")
                .with_reason(format!("'{}' has progress above 100", self.name)));
        }
        if self.duration_days == Some(0) {
            return Err(PlanningError::invalid_input("duration_days")
                .with_reason(format!("'{}' must have a positive duration", self.name)));
        }
        check_date_order(self.start_date, self.end_date)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_status(status: Option<&str>) -> Result<Option<ItemStatus>> {
    status
        .map(|s| {
            s.parse::<ItemStatus>()
                .map_err(|reason| PlanningError::invalid_input("status").with_reason(reason))
        })
        .transpose()
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<Date>> {
    value
        .map(|s| {
            s.parse::<Date>().map_err(|e| {
                PlanningError::invalid_input(field).with_reason(format!("'{s}' is not a date: {e}"))
            })
        })
        .transpose()
}

fn check_date_order(start: Option<Date>, end: Option<Date>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(PlanningError::invalid_input("end_date")
                .with_reason(format!("{end} is before the start date {start}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_update_to_patch() {
        let params = UpdateItem {
            id: Uuid::new_v4(),
            status: Some("in-progress".to_string()),
            progress: Some(40),
            start_date: Some("2024-03-01".to_string()),
            description: Some(String::new()),
            ..Default::default()
        };
        let patch = params.to_patch().unwrap();
        assert_eq!(patch.status, Some(ItemStatus::InProgress));
        assert_eq!(patch.progress, Some(40));
        assert_eq!(patch.start_date, Some(Some(date(2024, 3, 1))));
        assert_eq!(patch.description, Some(None));
        assert!(patch.name.is_none());
        assert!(!patch.is_structural());
    }

    #[test]
    fn test_update_rejects_bad_input() {
        let id = Uuid::new_v4();
        let over = UpdateItem {
            id,
            progress: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            over.to_patch(),
            Err(PlanningError::InvalidInput { field, .. }) if field == "progress"
        ));

        let backwards = UpdateItem {
            id,
            start_date: Some("2024-03-10".to_string()),
            end_date: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        assert!(backwards.to_patch().is_err());

        let status = UpdateItem {
            id,
            status: Some("finished-ish".to_string()),
            ..Default::default()
        };
        assert!(status.to_patch().unwrap_err().is_validation());
    }

    #[test]
    fn test_import_node_from_json() {
        let json = r#"{
            "name": "Launch",
            "type": "milestone",
            "children": [
                {"name": "Beta", "start_date": "2024-05-01"},
                {"name": "GA", "type": "deliverable", "children": [{"name": "Docs"}]}
            ]
        }"#;
        let node: ImportNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.item_type, Some(ItemType::Milestone));
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].item_type, None);
        assert_eq!(node.children[0].start_date, Some(date(2024, 5, 1)));
        assert_eq!(node.children[1].children[0].name, "Docs");
    }
}
