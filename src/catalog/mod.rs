//! Read-only access to table metadata
//!
//! A [`Catalog`] answers the handful of introspection questions the model
//! deriver needs for one `schema.table`. [`PostgresCatalog`] issues the queries
//! against a live connection; [`StaticCatalog`] serves canned facts.

mod memory;
mod pg;

pub use memory::{StaticCatalog, StaticTable};
pub use pg::{PostgresCatalog, queries};

use std::collections::HashMap;

use thiserror::Error;

/// Raw column info from `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    /// `udt_name`, e.g. `int8`, `timestamptz`, `_text`
    pub udt_name: String,
    pub nullable: bool,
    /// `GENERATED ... AS IDENTITY`
    pub is_identity: bool,
    pub default: Option<String>,
    /// Filled from [`Catalog::column_comments`], empty when undocumented
    pub comment: String,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, udt_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            udt_name: udt_name.into(),
            nullable: false,
            is_identity: false,
            default: None,
            comment: String::new(),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A failed catalog query.
#[derive(Debug, Error)]
#[error("catalog query '{query}' failed: {source}")]
pub struct CatalogError {
    /// Which introspection step failed (`columns`, `primary_key`, ...)
    pub query: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl CatalogError {
    pub fn new(
        query: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            query,
            source: source.into(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Queryable source of table metadata.
///
/// Every method is side-effect free and scoped to a single `schema.table`.
/// Column lists are returned in constraint ordinal order.
pub trait Catalog {
    /// Columns in ordinal position order; empty when the table does not exist.
    fn columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<RawColumn>>;

    /// Column name → comment for documented columns.
    fn column_comments(&mut self, schema: &str, table: &str)
    -> CatalogResult<HashMap<String, String>>;

    fn primary_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>>;

    /// Columns of the unique constraint with the smallest name.
    fn unique_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>>;

    /// Primary key columns of the partitioned parent, when `table` is a partition.
    fn partition_parent_key_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<String>>;

    /// Distinct names of columns that appear in any index, sorted.
    fn indexed_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>>;
}

impl<C: Catalog + ?Sized> Catalog for &mut C {
    fn columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<RawColumn>> {
        (**self).columns(schema, table)
    }

    fn column_comments(
        &mut self,
        schema: &str,
        table: &str,
    ) -> CatalogResult<HashMap<String, String>> {
        (**self).column_comments(schema, table)
    }

    fn primary_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        (**self).primary_key_columns(schema, table)
    }

    fn unique_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        (**self).unique_key_columns(schema, table)
    }

    fn partition_parent_key_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<String>> {
        (**self).partition_parent_key_columns(schema, table)
    }

    fn indexed_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        (**self).indexed_columns(schema, table)
    }
}
