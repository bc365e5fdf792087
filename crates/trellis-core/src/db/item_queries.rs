//! Plan item CRUD operations and queries.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, PlanningError, Result},
    models::{ItemId, ItemPatch, ItemStatus, ItemType, NewPlanItem, PlanItem, Predecessor},
    mutator::SORT_ORDER_STEP,
    store::wbs,
};

const ITEM_COLUMNS: &str = "id, project_id, parent_id, item_type, name, description, status, progress, start_date, end_date, duration_days, indent_level, sort_order, wbs, predecessors, estimate_component_id, is_published, published_milestone_id, published_deliverable_id, is_deleted, created_at, updated_at";
const INSERT_ITEM_SQL: &str = "INSERT INTO plan_items (id, project_id, parent_id, item_type, name, description, status, progress, start_date, end_date, duration_days, indent_level, sort_order, wbs, predecessors, estimate_component_id, is_published, published_milestone_id, published_deliverable_id, is_deleted, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)";
const UPDATE_ITEM_SQL: &str = "UPDATE plan_items SET parent_id = ?2, item_type = ?3, name = ?4, description = ?5, status = ?6, progress = ?7, start_date = ?8, end_date = ?9, duration_days = ?10, indent_level = ?11, sort_order = ?12, predecessors = ?13, estimate_component_id = ?14, updated_at = ?15 WHERE id = ?1";
const NEXT_SORT_ORDER_SQL: &str = "SELECT COALESCE(MAX(sort_order), 0) + ?3 FROM plan_items WHERE project_id = ?1 AND parent_id IS ?2 AND is_deleted = 0";
const SET_DELETED_SQL: &str = "UPDATE plan_items SET is_deleted = ?1, updated_at = ?2 WHERE id = ?3";
const SET_WBS_SQL: &str = "UPDATE plan_items SET wbs = ?1 WHERE id = ?2";
const SELECT_PROJECT_OF_ITEM_SQL: &str = "SELECT project_id FROM plan_items WHERE id = ?1";

impl super::Database {
    /// Helper function to construct a PlanItem from a database row
    fn build_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<PlanItem> {
        Ok(PlanItem {
            id: parse_column(row, 0, Uuid::parse_str)?,
            project_id: row.get::<_, i64>(1)? as u64,
            parent_id: parse_optional_column(row, 2, Uuid::parse_str)?,
            item_type: parse_column(row, 3, str::parse::<ItemType>)?,
            name: row.get(4)?,
            description: row.get(5)?,
            status: parse_column(row, 6, str::parse::<ItemStatus>)?,
            progress: row.get(7)?,
            start_date: parse_optional_column(row, 8, str::parse::<Date>)?,
            end_date: parse_optional_column(row, 9, str::parse::<Date>)?,
            duration_days: row.get(10)?,
            indent_level: row.get(11)?,
            sort_order: row.get(12)?,
            wbs: row.get(13)?,
            predecessors: parse_column(row, 14, |s: &str| {
                serde_json::from_str::<Vec<Predecessor>>(s)
            })?,
            estimate_component_id: row.get(15)?,
            is_published: row.get(16)?,
            published_milestone_id: row.get(17)?,
            published_deliverable_id: row.get(18)?,
            is_deleted: row.get(19)?,
            created_at: parse_optional_column(row, 20, str::parse::<Timestamp>)?,
            updated_at: parse_optional_column(row, 21, str::parse::<Timestamp>)?,
        })
    }

    fn query_item(conn: &Connection, id: ItemId) -> Result<Option<PlanItem>> {
        conn.query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM plan_items WHERE id = ?1"),
            params![id.to_string()],
            Self::build_item_from_row,
        )
        .optional()
        .db_context("Failed to query plan item")
    }

    fn insert_item(conn: &Connection, item: &PlanItem) -> Result<()> {
        let predecessors = serde_json::to_string(&item.predecessors)?;
        conn.execute(
            INSERT_ITEM_SQL,
            params![
                item.id.to_string(),
                item.project_id as i64,
                item.parent_id.map(|id| id.to_string()),
                item.item_type.as_str(),
                item.name,
                item.description,
                item.status.as_str(),
                item.progress,
                item.start_date.map(|d| d.to_string()),
                item.end_date.map(|d| d.to_string()),
                item.duration_days,
                item.indent_level,
                item.sort_order,
                item.wbs,
                predecessors,
                item.estimate_component_id,
                item.is_published,
                item.published_milestone_id,
                item.published_deliverable_id,
                item.is_deleted,
                item.created_at.map(|t| t.to_string()),
                item.updated_at.map(|t| t.to_string()),
            ],
        )
        .db_context("Failed to insert plan item")?;
        Ok(())
    }

    fn ensure_project(conn: &Connection, project_id: u64) -> Result<()> {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
                params![project_id as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check project existence")?;
        if !exists {
            return Err(PlanningError::ProjectNotFound { id: project_id });
        }
        Ok(())
    }

    /// Lists the items of a project ordered by `sort_order`.
    pub fn list_items(&self, project_id: u64, include_deleted: bool) -> Result<Vec<PlanItem>> {
        let filter = if include_deleted {
            ""
        } else {
            " AND is_deleted = 0"
        };
        let mut stmt = self
            .connection
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM plan_items WHERE project_id = ?1{filter} ORDER BY sort_order, id"
            ))
            .db_context("Failed to prepare query")?;
        let items = stmt
            .query_map(params![project_id as i64], Self::build_item_from_row)
            .db_context("Failed to query plan items")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read plan item row")?;
        Ok(items)
    }

    /// Retrieves an item by its ID, including soft-deleted ones.
    pub fn get_item(&self, id: ItemId) -> Result<Option<PlanItem>> {
        Self::query_item(&self.connection, id)
    }

    /// Creates one item after its last sibling unless an order is given.
    pub fn create_item(&mut self, new_item: NewPlanItem) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        Self::ensure_project(&tx, new_item.project_id)?;
        if let Some(parent_id) = new_item.parent_id {
            let parent = Self::query_item(&tx, parent_id)?
                .filter(|parent| !parent.is_deleted && parent.project_id == new_item.project_id);
            if parent.is_none() {
                return Err(PlanningError::ItemNotFound { id: parent_id });
            }
        }

        let sort_order = match new_item.sort_order {
            Some(order) => order,
            None => tx
                .query_row(
                    NEXT_SORT_ORDER_SQL,
                    params![
                        new_item.project_id as i64,
                        new_item.parent_id.map(|id| id.to_string()),
                        SORT_ORDER_STEP
                    ],
                    |row| row.get(0),
                )
                .db_context("Failed to get next sort order")?,
        };

        let now = Timestamp::now();
        let item = new_item.into_item(sort_order, now);
        Self::insert_item(&tx, &item)?;
        Self::touch_project(&tx, item.project_id, &now.to_string())?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(item)
    }

    /// Inserts prepared items in order within one transaction.
    pub fn create_items(&mut self, project_id: u64, items: Vec<PlanItem>) -> Result<Vec<PlanItem>> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        Self::ensure_project(&tx, project_id)?;

        let now = Timestamp::now();
        let mut created = Vec::with_capacity(items.len());
        for mut item in items {
            item.project_id = project_id;
            item.is_deleted = false;
            item.created_at = Some(now);
            item.updated_at = Some(now);
            Self::insert_item(&tx, &item)?;
            created.push(item);
        }

        Self::touch_project(&tx, project_id, &now.to_string())?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(created)
    }

    /// Applies a partial update to a non-deleted item.
    pub fn update_item(&mut self, id: ItemId, patch: &ItemPatch) -> Result<PlanItem> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let mut item = Self::query_item(&tx, id)?
            .filter(|item| !item.is_deleted)
            .ok_or(PlanningError::ItemNotFound { id })?;
        let now = Timestamp::now();
        item.apply_patch(patch);
        item.updated_at = Some(now);

        let predecessors = serde_json::to_string(&item.predecessors)?;
        tx.execute(
            UPDATE_ITEM_SQL,
            params![
                item.id.to_string(),
                item.parent_id.map(|id| id.to_string()),
                item.item_type.as_str(),
                item.name,
                item.description,
                item.status.as_str(),
                item.progress,
                item.start_date.map(|d| d.to_string()),
                item.end_date.map(|d| d.to_string()),
                item.duration_days,
                item.indent_level,
                item.sort_order,
                predecessors,
                item.estimate_component_id,
                now.to_string(),
            ],
        )
        .db_context("Failed to update plan item")?;

        Self::touch_project(&tx, item.project_id, &now.to_string())?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(item)
    }

    /// Sets or clears the deleted flag of every item in `ids`.
    ///
    /// Fails without changing anything when one of the ids is unknown.
    pub fn set_items_deleted(&mut self, ids: &[ItemId], deleted: bool) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        for id in ids {
            let changed = tx
                .execute(SET_DELETED_SQL, params![deleted, &now, id.to_string()])
                .db_context("Failed to update deleted flag")?;
            if changed == 0 {
                return Err(PlanningError::ItemNotFound { id: *id });
            }
        }

        if let Some(first) = ids.first() {
            let project_id: Option<i64> = tx
                .query_row(SELECT_PROJECT_OF_ITEM_SQL, params![first.to_string()], |row| {
                    row.get(0)
                })
                .optional()
                .db_context("Failed to look up project")?;
            if let Some(project_id) = project_id {
                Self::touch_project(&tx, project_id as u64, &now)?;
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    /// Rewrites the `wbs` column of every item in the project.
    pub fn recalculate_wbs(&mut self, project_id: u64) -> Result<()> {
        let items = self.list_items(project_id, true)?;
        let numbers = wbs::compute_wbs(&items);

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        for item in &items {
            let number = numbers.get(&item.id);
            if number != item.wbs.as_ref() {
                tx.execute(SET_WBS_SQL, params![number, item.id.to_string()])
                    .db_context("Failed to update WBS number")?;
            }
        }
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }
}
