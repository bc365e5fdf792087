//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can hand it straight to the
//! terminal skin.

use std::fmt;

use super::datetime::{DateRange, LocalDateTime};
use crate::models::{DependencyType, ItemStatus, ItemType, PlanItem, Predecessor, Project};

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `<id> (FS)`, with the lag appended when there is one: `<id> (SS+2d)`.
impl fmt::Display for Predecessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.id, self.dependency_type)?;
        if self.lag != 0 {
            write!(f, "{:+}d", self.lag)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wbs {
            Some(wbs) => writeln!(f, "## {wbs} {}", self.name)?,
            None => writeln!(f, "## {}", self.name)?,
        }
        writeln!(f)?;

        writeln!(f, "- Type: {} {}", self.item_type.marker(), self.item_type)?;
        writeln!(f, "- Status: {}", self.status.with_icon())?;
        writeln!(f, "- Progress: {}%", self.progress)?;
        if self.start_date.is_some() || self.end_date.is_some() {
            writeln!(f, "- Dates: {}", DateRange::new(self.start_date, self.end_date))?;
        }
        if let Some(days) = self.duration_days {
            let unit = if days == 1 { "day" } else { "days" };
            writeln!(f, "- Duration: {days} {unit}")?;
        }
        if let Some(estimate) = &self.estimate_component_id {
            writeln!(f, "- Estimate: {estimate}")?;
        }
        if self.is_published {
            writeln!(f, "- Published")?;
        }
        writeln!(f, "- ID: `{}`", self.id)?;

        if !self.predecessors.is_empty() {
            writeln!(f)?;
            writeln!(f, "### Depends on")?;
            writeln!(f)?;
            for predecessor in &self.predecessors {
                writeln!(f, "- {predecessor}")?;
            }
        }

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }
        Ok(())
    }
}
