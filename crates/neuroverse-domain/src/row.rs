//! Row module - the persistence collaborator's data shapes
//!
//! Persistence is a plain row store over four named collections. Rows are
//! ordered maps from column name to [`FieldValue`]; every stored row carries
//! an integer `id`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A stored row: column name → value
pub type Row = BTreeMap<String, FieldValue>;

/// Named collection in the row store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Captured tasks (usually saved from brain-dump items)
    Tasks,

    /// Journal notes
    Notes,

    /// Free-form memory text injected into chat prompts (single row)
    Memory,

    /// Chat history
    Messages,
}

impl Collection {
    /// All collections
    pub const ALL: [Collection; 4] = [
        Collection::Tasks,
        Collection::Notes,
        Collection::Memory,
        Collection::Messages,
    ];

    /// Table name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Notes => "notes",
            Collection::Memory => "memory",
            Collection::Messages => "messages",
        }
    }

    /// Columns, `id` first
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Collection::Tasks => &["id", "text", "tag", "priority", "done", "created_at"],
            Collection::Notes => &["id", "title", "content", "created_at", "updated_at"],
            Collection::Memory => &["id", "content", "updated_at"],
            Collection::Messages => &["id", "role", "content", "created_at"],
        }
    }

    /// Whether `column` belongs to this collection
    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Parse a collection from its table name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == s)
    }
}

/// A single column value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL NULL / JSON null
    Null,

    /// Boolean flag
    Bool(bool),

    /// Integer (ids, timestamps)
    Integer(i64),

    /// Text
    Text(String),
}

impl FieldValue {
    /// Borrow as text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read as integer, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as boolean; integers are treated as SQLite booleans
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Select criteria
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowQuery {
    /// Equality filters, all of which must match
    pub filters: Vec<(String, FieldValue)>,

    /// Sort column and direction (`true` = ascending)
    pub order_by: Option<(String, bool)>,

    /// Maximum rows to return
    pub limit: Option<usize>,
}

impl RowQuery {
    /// Match every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Sort by `column`
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some((column.into(), ascending));
        self
    }

    /// Cap the number of rows
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_columns() {
        for collection in Collection::ALL {
            assert_eq!(collection.columns()[0], "id");
            assert_eq!(Collection::parse(collection.name()), Some(collection));
        }
        assert!(Collection::Tasks.has_column("done"));
        assert!(!Collection::Tasks.has_column("title"));
        assert_eq!(Collection::parse("users"), None);
    }

    #[test]
    fn test_field_value_json() {
        let mut row = Row::new();
        row.insert("id".into(), 7.into());
        row.insert("done".into(), false.into());
        row.insert("text".into(), "wax".into());
        row.insert("title".into(), FieldValue::from(None::<String>));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"done":false,"id":7,"text":"wax","title":null}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_query_builder() {
        let query = RowQuery::new()
            .filter("id", 1)
            .order_by("created_at", false)
            .limit(20);

        assert_eq!(query.filters, vec![("id".to_string(), FieldValue::Integer(1))]);
        assert_eq!(query.order_by, Some(("created_at".to_string(), false)));
        assert_eq!(query.limit, Some(20));
    }

    #[test]
    fn test_integer_as_bool() {
        assert_eq!(FieldValue::Integer(1).as_bool(), Some(true));
        assert_eq!(FieldValue::Integer(0).as_bool(), Some(false));
        assert_eq!(FieldValue::Null.as_bool(), None);
    }
}
