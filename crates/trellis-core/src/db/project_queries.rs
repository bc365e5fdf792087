//! Project CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension};

use super::parse_column;
use crate::{
    error::{DatabaseResultExt, Result},
    models::Project,
};

const INSERT_PROJECT_SQL: &str =
    "INSERT INTO projects (name, description, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_PROJECT_SQL: &str =
    "SELECT id, name, description, created_at, updated_at FROM projects WHERE id = ?1";
const SELECT_PROJECTS_SQL: &str =
    "SELECT id, name, description, created_at, updated_at FROM projects ORDER BY id";
const CHECK_PROJECT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)";
const TOUCH_PROJECT_SQL: &str = "UPDATE projects SET updated_at = ?1 WHERE id = ?2";

impl super::Database {
    fn build_project_from_row(row: &rusqlite::Row) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get::<_, i64>(0)? as u64,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: parse_column(row, 3, str::parse::<Timestamp>)?,
            updated_at: parse_column(row, 4, str::parse::<Timestamp>)?,
        })
    }

    /// Creates a new project.
    pub fn create_project(&mut self, name: &str, description: Option<&str>) -> Result<Project> {
        let now = Timestamp::now();
        let now_str = now.to_string();

        self.connection
            .execute(
                INSERT_PROJECT_SQL,
                params![name, description, &now_str, &now_str],
            )
            .db_context("Failed to insert project")?;

        Ok(Project {
            id: self.connection.last_insert_rowid() as u64,
            name: name.into(),
            description: description.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Retrieves a project by its ID.
    pub fn get_project(&self, id: u64) -> Result<Option<Project>> {
        self.connection
            .query_row(
                SELECT_PROJECT_SQL,
                params![id as i64],
                Self::build_project_from_row,
            )
            .optional()
            .db_context("Failed to query project")
    }

    /// Lists every project, oldest first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PROJECTS_SQL)
            .db_context("Failed to prepare query")?;
        let projects = stmt
            .query_map([], Self::build_project_from_row)
            .db_context("Failed to query projects")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read project row")?;
        Ok(projects)
    }

    pub fn project_exists(&self, id: u64) -> Result<bool> {
        self.connection
            .query_row(CHECK_PROJECT_EXISTS_SQL, params![id as i64], |row| row.get(0))
            .db_context("Failed to check project existence")
    }

    /// Bumps a project's `updated_at`.
    pub(super) fn touch_project(conn: &rusqlite::Connection, id: u64, now: &str) -> Result<()> {
        conn.execute(TOUCH_PROJECT_SQL, params![now, id as i64])
            .db_context("Failed to update project timestamp")?;
        Ok(())
    }
}
