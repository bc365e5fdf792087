//! Builder for creating and configuring Planner instances.

use std::path::{Path, PathBuf};

use super::Planner;
use crate::{
    error::{PlanningError, Result},
    history::{History, DEFAULT_HISTORY_CAPACITY},
    store::{PlanStore, SqliteStore},
};

/// Builder for creating and configuring Planner instances.
#[derive(Debug, Clone)]
pub struct PlannerBuilder {
    project_id: u64,
    database_path: Option<PathBuf>,
    history_capacity: usize,
}

impl PlannerBuilder {
    /// Creates a builder for a session over `project_id`.
    pub fn new(project_id: u64) -> Self {
        Self {
            project_id,
            database_path: None,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/trellis/trellis.db` or `~/.local/share/trellis/trellis.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets how many actions undo can reach back.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Builds a planner over the SQLite database.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::FileSystem` if the database path is invalid,
    /// `PlanningError::Database` if database initialization fails and
    /// `PlanningError::ProjectNotFound` if the project does not exist.
    pub async fn build(self) -> Result<Planner<SqliteStore>> {
        let db_path = match &self.database_path {
            Some(path) => path.clone(),
            None => SqliteStore::default_path()?,
        };

        let store = SqliteStore::open(db_path).await?;
        if store.get_project(self.project_id).await?.is_none() {
            return Err(PlanningError::ProjectNotFound {
                id: self.project_id,
            });
        }
        self.build_with_store(store).await
    }

    /// Builds a planner over any store and loads the project's items.
    pub async fn build_with_store<S: PlanStore>(self, store: S) -> Result<Planner<S>> {
        let history = History::with_capacity(self.history_capacity);
        let mut planner = Planner::new(store, self.project_id, history);
        planner.refresh().await?;
        log::debug!(
            "Planner ready for project {} with {} items",
            self.project_id,
            planner.items.len()
        );
        Ok(planner)
    }
}
