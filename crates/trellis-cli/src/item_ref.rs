//! Resolution of user-typed item references.
//!
//! An item can be named by its outline number (`1.2.3`), its full UUID, or
//! an unambiguous UUID prefix of at least four hex digits.

use anyhow::{bail, Result};
use trellis_core::models::{ItemId, PlanItem};

const MIN_PREFIX_LEN: usize = 4;

/// Looks up references against one snapshot of a project's items.
pub struct ItemRefs<'a> {
    items: &'a [PlanItem],
}

impl<'a> ItemRefs<'a> {
    pub fn new(items: &'a [PlanItem]) -> Self {
        Self { items }
    }

    pub fn resolve(&self, reference: &str) -> Result<ItemId> {
        let reference = reference.trim();
        if let Some(item) = self
            .items
            .iter()
            .find(|item| item.wbs.as_deref() == Some(reference))
        {
            return Ok(item.id);
        }
        if let Ok(id) = reference.parse::<ItemId>() {
            if self.items.iter().any(|item| item.id == id) {
                return Ok(id);
            }
            bail!("No item with ID {id}");
        }

        let prefix = reference.to_lowercase();
        if prefix.len() < MIN_PREFIX_LEN || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            bail!("No item matches '{reference}'");
        }
        let mut matches = self
            .items
            .iter()
            .filter(|item| item.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item.id),
            (Some(_), Some(_)) => bail!("'{reference}' matches several items; use more digits"),
            (None, _) => bail!("No item matches '{reference}'"),
        }
    }

    pub fn resolve_optional(&self, reference: Option<&str>) -> Result<Option<ItemId>> {
        reference.map(|r| self.resolve(r)).transpose()
    }

    pub fn resolve_all(&self, references: &[String]) -> Result<Vec<ItemId>> {
        references.iter().map(|r| self.resolve(r)).collect()
    }
}
