//! SQLite-backed plan store.
//!
//! Every call opens a fresh [`Database`] connection inside
//! `tokio::task::spawn_blocking`, so the async side never blocks on SQLite.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::task;

use super::PlanStore;
use crate::{
    db::Database,
    error::{JoinResultExt, PlanningError, Result},
    models::{ItemId, ItemPatch, NewPlanItem, PlanItem, Project},
};

/// Plan store persisting to one SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and initializes the
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::FileSystem` if the parent directory cannot be
    /// created and `PlanningError::Database` if initialization fails.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PlanningError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let store = Self { db_path };
        store.with_db(|_| Ok(())).await?;
        log::debug!("Opened plan store at {}", store.db_path.display());
        Ok(store)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification: `$XDG_DATA_HOME/trellis/trellis.db`.
    pub fn default_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("trellis")
            .place_data_file("trellis.db")
            .map_err(|e| PlanningError::XdgDirectory(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .join_context()?
    }

    pub async fn create_project(&self, name: &str, description: Option<&str>) -> Result<Project> {
        let name = name.to_string();
        let description = description.map(String::from);
        self.with_db(move |db| db.create_project(&name, description.as_deref()))
            .await
    }

    pub async fn get_project(&self, id: u64) -> Result<Option<Project>> {
        self.with_db(move |db| db.get_project(id)).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.with_db(|db| db.list_projects()).await
    }

    /// Looks up an item whether or not it is deleted.
    pub async fn get_item(&self, id: ItemId) -> Result<Option<PlanItem>> {
        self.with_db(move |db| db.get_item(id)).await
    }
}

#[async_trait]
impl PlanStore for SqliteStore {
    async fn fetch_all(&self, project_id: u64) -> Result<Vec<PlanItem>> {
        self.with_db(move |db| db.list_items(project_id, false))
            .await
    }

    async fn create_item(&self, item: NewPlanItem) -> Result<PlanItem> {
        self.with_db(move |db| db.create_item(item)).await
    }

    async fn create_batch(&self, project_id: u64, items: Vec<PlanItem>) -> Result<Vec<PlanItem>> {
        self.with_db(move |db| db.create_items(project_id, items))
            .await
    }

    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<PlanItem> {
        self.with_db(move |db| db.update_item(id, &patch)).await
    }

    async fn soft_delete_batch(&self, ids: &[ItemId]) -> Result<()> {
        let ids = ids.to_vec();
        self.with_db(move |db| db.set_items_deleted(&ids, true))
            .await
    }

    async fn recalculate_wbs(&self, project_id: u64) -> Result<()> {
        self.with_db(move |db| db.recalculate_wbs(project_id))
            .await
    }

    async fn restore(&self, ids: &[ItemId]) -> Result<()> {
        let ids = ids.to_vec();
        self.with_db(move |db| db.set_items_deleted(&ids, false))
            .await
    }
}
