//! Project model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A project owning one work breakdown structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier for the project
    pub id: u64,

    /// Name of the project
    pub name: String,

    /// Detailed multi-line description of the project
    pub description: Option<String>,

    /// Timestamp when the project was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the project was last modified (UTC)
    pub updated_at: Timestamp,
}
