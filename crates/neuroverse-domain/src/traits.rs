//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Collection, Row, RowQuery};

/// Trait for row persistence over named collections
///
/// Implemented by the infrastructure layer (neuroverse-store)
pub trait RowStore {
    /// Error type for store operations
    type Error;

    /// Select rows matching the query
    fn select(&self, collection: Collection, query: &RowQuery) -> Result<Vec<Row>, Self::Error>;

    /// Insert a row and return it as stored (including `id`)
    fn insert(&mut self, collection: Collection, fields: Row) -> Result<Row, Self::Error>;

    /// Update the given columns of row `id` and return the updated row
    fn update(&mut self, collection: Collection, id: i64, fields: Row) -> Result<Row, Self::Error>;

    /// Delete row `id`
    fn delete(&mut self, collection: Collection, id: i64) -> Result<(), Self::Error>;

    /// Insert row `id`, or update it if it already exists, and return it
    fn upsert(&mut self, collection: Collection, id: i64, fields: Row) -> Result<Row, Self::Error>;
}
