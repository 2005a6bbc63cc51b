//! NeuroVerse Storage Layer
//!
//! Implements the `RowStore` trait on SQLite.
//!
//! # Architecture
//!
//! - One table per [`Collection`], created from `schema.sql` at open
//! - SQL is assembled only from the collection's fixed column list; values
//!   are always bound as parameters
//! - `created_at` / `updated_at` are stamped by the store (Unix seconds)
//!
//! # Examples
//!
//! ```no_run
//! use neuroverse_domain::traits::RowStore;
//! use neuroverse_domain::{Collection, Row};
//! use neuroverse_store::SqliteStore;
//!
//! let mut store = SqliteStore::new(":memory:").unwrap();
//! let mut task = Row::new();
//! task.insert("text".into(), "buy wax".into());
//! let row = store.insert(Collection::Tasks, task).unwrap();
//! assert!(row.contains_key("id"));
//! ```

#![warn(missing_docs)]

use neuroverse_domain::traits::RowStore;
use neuroverse_domain::{Collection, FieldValue, Row, RowQuery};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Invalid data format (unknown column, unsupported value)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Columns stored as INTEGER but exposed as booleans
const BOOL_COLUMNS: &[(Collection, &str)] = &[(Collection::Tasks, "done")];

/// SQLite-based implementation of RowStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks
/// behind a `Mutex`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Reject any column the collection does not declare
    fn check_columns<'a>(
        collection: Collection,
        columns: impl IntoIterator<Item = &'a String>,
    ) -> Result<(), StoreError> {
        for column in columns {
            if !collection.has_column(column) {
                return Err(StoreError::InvalidData(format!(
                    "Unknown column '{}' for {}",
                    column,
                    collection.name()
                )));
            }
        }
        Ok(())
    }

    /// Fill in timestamps the caller did not supply
    fn stamp(collection: Collection, fields: &mut Row, creating: bool) {
        let now = FieldValue::Integer(now_secs());
        if creating && collection.has_column("created_at") {
            fields.entry("created_at".to_string()).or_insert_with(|| now.clone());
        }
        if collection.has_column("updated_at") {
            fields.entry("updated_at".to_string()).or_insert(now);
        }
    }

    fn to_sql(value: &FieldValue) -> Value {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Integer(i64::from(*b)),
            FieldValue::Integer(i) => Value::Integer(*i),
            FieldValue::Text(s) => Value::Text(s.clone()),
        }
    }

    fn from_sql(collection: Collection, column: &str, value: Value) -> FieldValue {
        let is_bool = BOOL_COLUMNS
            .iter()
            .any(|(c, name)| *c == collection && *name == column);

        match value {
            Value::Null => FieldValue::Null,
            Value::Integer(i) if is_bool => FieldValue::Bool(i != 0),
            Value::Integer(i) => FieldValue::Integer(i),
            Value::Real(f) => FieldValue::Integer(f as i64),
            Value::Text(s) => FieldValue::Text(s),
            Value::Blob(b) => FieldValue::Text(String::from_utf8_lossy(&b).into_owned()),
        }
    }

    fn read_row(collection: Collection, row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
        let mut out = Row::new();
        for (idx, column) in collection.columns().iter().enumerate() {
            let value: Value = row.get(idx)?;
            out.insert(column.to_string(), Self::from_sql(collection, column, value));
        }
        Ok(out)
    }

    /// Fetch a single row by id
    pub fn get(&self, collection: Collection, id: i64) -> Result<Option<Row>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            collection.columns().join(", "),
            collection.name()
        );

        let row = self
            .conn
            .query_row(&sql, params![id], |row| Self::read_row(collection, row))
            .optional()?;

        Ok(row)
    }

    fn get_existing(&self, collection: Collection, id: i64) -> Result<Row, StoreError> {
        self.get(collection, id)?
            .ok_or_else(|| StoreError::NotFound(format!("{} id {}", collection.name(), id)))
    }
}

impl RowStore for SqliteStore {
    type Error = StoreError;

    fn select(&self, collection: Collection, query: &RowQuery) -> Result<Vec<Row>, Self::Error> {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE 1=1",
            collection.columns().join(", "),
            collection.name()
        );
        let mut values: Vec<Value> = Vec::new();

        Self::check_columns(collection, query.filters.iter().map(|(c, _)| c))?;
        for (column, value) in &query.filters {
            if *value == FieldValue::Null {
                sql.push_str(&format!(" AND {} IS NULL", column));
            } else {
                sql.push_str(&format!(" AND {} = ?", column));
                values.push(Self::to_sql(value));
            }
        }

        match &query.order_by {
            Some((column, ascending)) => {
                Self::check_columns(collection, [column])?;
                let direction = if *ascending { "ASC" } else { "DESC" };
                // Tie-break on id so equal timestamps keep insertion order
                sql.push_str(&format!(" ORDER BY {} {}, id {}", column, direction, direction));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit as i64));
        }

        debug!("select from {}: {}", collection.name(), sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Self::read_row(collection, row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn insert(&mut self, collection: Collection, mut fields: Row) -> Result<Row, Self::Error> {
        Self::check_columns(collection, fields.keys())?;
        Self::stamp(collection, &mut fields, true);

        let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            collection.name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        let values: Vec<Value> = fields.values().map(Self::to_sql).collect();

        self.conn.execute(&sql, params_from_iter(values.iter()))?;
        let id = self.conn.last_insert_rowid();

        self.get_existing(collection, id)
    }

    fn update(&mut self, collection: Collection, id: i64, mut fields: Row) -> Result<Row, Self::Error> {
        fields.remove("id");
        Self::check_columns(collection, fields.keys())?;
        Self::stamp(collection, &mut fields, false);

        if fields.is_empty() {
            return self.get_existing(collection, id);
        }

        let assignments: Vec<String> = fields
            .keys()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            collection.name(),
            assignments.join(", "),
            fields.len() + 1
        );
        let mut values: Vec<Value> = fields.values().map(Self::to_sql).collect();
        values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} id {}", collection.name(), id)));
        }

        self.get_existing(collection, id)
    }

    fn delete(&mut self, collection: Collection, id: i64) -> Result<(), Self::Error> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", collection.name());
        self.conn.execute(&sql, params![id])?;
        Ok(())
    }

    fn upsert(&mut self, collection: Collection, id: i64, mut fields: Row) -> Result<Row, Self::Error> {
        fields.remove("id");
        Self::check_columns(collection, fields.keys())?;
        Self::stamp(collection, &mut fields, true);

        let mut columns: Vec<&str> = vec!["id"];
        columns.extend(fields.keys().map(String::as_str));
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

        // created_at belongs to the first write only
        let updates: Vec<String> = fields
            .keys()
            .filter(|c| c.as_str() != "created_at")
            .map(|c| format!("{} = excluded.{}", c, c))
            .collect();
        let conflict = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) {}",
            collection.name(),
            columns.join(", "),
            placeholders.join(", "),
            conflict
        );
        let mut values: Vec<Value> = vec![Value::Integer(id)];
        values.extend(fields.values().map(Self::to_sql));

        self.conn.execute(&sql, params_from_iter(values.iter()))?;

        self.get_existing(collection, id)
    }
}

/// Current time as Unix seconds
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
