//! SQLite persistence for projects and plan items.
//!
//! [`Database`] wraps one `rusqlite` connection. It is opened per operation
//! by [`crate::store::SqliteStore`] inside `spawn_blocking`, so nothing here
//! is async.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod item_queries;
pub mod migrations;
pub mod project_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Parses a text column, reporting failures as conversion errors of `idx`.
fn parse_column<T, E>(
    row: &rusqlite::Row,
    idx: usize,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> rusqlite::Result<T>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let text: String = row.get(idx)?;
    parse(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

/// Like [`parse_column`] for nullable columns.
fn parse_optional_column<T, E>(
    row: &rusqlite::Row,
    idx: usize,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> rusqlite::Result<Option<T>>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let text: Option<String> = row.get(idx)?;
    text.as_deref()
        .map(parse)
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
        })
}
