//! SQLite persistence for the portal.
//!
//! A single [`Store`] owns the connection behind a mutex and hands it to
//! closures, either as a plain connection for reads or wrapped in a
//! transaction for writes. The submodules hold the queries for each area and
//! take `&Connection`, so a service can compose several of them inside one
//! transaction (a `Transaction` derefs to a `Connection`).

pub mod catalogue;
pub mod content;
pub mod requests;
pub mod schema;
pub mod settings;

use common::forms::FieldErrors;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, Row, Transaction};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness or reference constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database lock poisoned")]
    Poisoned,

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(message.unwrap_or_else(|| code.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

/// Shared handle to the portal database.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database at `path` and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Fresh in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the connection without opening a transaction.
    pub fn read<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    /// Run `f` inside a transaction, committing only when it succeeds.
    pub fn write<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let tx = conn.transaction().map_err(StoreError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

/// CRUD for the simple content tables the admin API edits field-for-field.
pub trait Resource: Sized {
    const TABLE: &'static str;

    /// Validate and normalize before a write.
    fn prepare(&mut self) -> Result<(), FieldErrors>;

    /// Checks that need the database, such as referenced ids existing.
    fn check_references(&self, _conn: &Connection) -> Result<FieldErrors, StoreError> {
        Ok(FieldErrors::new())
    }

    fn list(conn: &Connection) -> Result<Vec<Self>, StoreError>;

    fn get(conn: &Connection, id: i64) -> Result<Self, StoreError>;

    /// Insert and return the new row id.
    fn insert(&self, conn: &Connection) -> Result<i64, StoreError>;

    fn update(&self, conn: &Connection, id: i64) -> Result<(), StoreError>;

    fn delete(conn: &Connection, id: i64) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::TABLE);
        expect_changed(conn.execute(&sql, params![id])?)
    }
}

/// Maps "no rows touched" to `NotFound`.
pub(crate) fn expect_changed(changed: usize) -> Result<(), StoreError> {
    if changed == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

pub(crate) fn row_exists(conn: &Connection, table: &str, id: i64) -> Result<bool, StoreError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    Ok(conn.query_row(&sql, params![id], |row| row.get(0))?)
}

pub(crate) fn all_ids(conn: &Connection, table: &str) -> Result<HashSet<i64>, StoreError> {
    let sql = format!("SELECT id FROM {}", table);
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<i64>, _>>()?;
    Ok(ids)
}

/// Id of the first row whose `column` equals `value`.
pub(crate) fn find_id_by(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
) -> Result<Option<i64>, StoreError> {
    let sql = format!("SELECT id FROM {} WHERE {} = ?1 ORDER BY id LIMIT 1", table, column);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![value], |row| row.get(0))?;
    Ok(rows.next().transpose()?)
}

/// Decimals are stored as TEXT to keep their exact scale.
pub(crate) fn decimal_to_sql(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}

pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Decimal::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Enumerations are stored by their `as_str` spelling.
pub(crate) fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_write_rolls_back() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), StoreError> = store.write(|tx| {
            tx.execute(
                "INSERT INTO faqs (question, answer) VALUES ('q', 'a')",
                [],
            )?;
            Err(StoreError::Conflict("forced".into()))
        });
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        let count: i64 = store
            .read(|conn| {
                conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), StoreError> = store.write(|tx| {
            tx.execute("INSERT INTO categories (name, slug) VALUES ('A', 'a')", [])?;
            tx.execute("INSERT INTO categories (name, slug) VALUES ('B', 'a')", [])?;
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<i64, StoreError> = store.read(|conn| {
            Ok(conn.query_row("SELECT id FROM faqs WHERE id = 99", [], |row| row.get(0))?)
        });
        assert!(matches!(result, Err(StoreError::NotFound)));
    }
}
