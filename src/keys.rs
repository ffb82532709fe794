//! Identity column resolution
//!
//! The first non-empty source wins: the table's primary key, then its first
//! unique constraint by name, then the primary key of the partitioned parent.

use std::fmt;

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::GenError;

/// Where the identity columns came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    PrimaryKey,
    Unique,
    PartitionParent,
}

impl KeySource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::Unique => "unique constraint",
            Self::PartitionParent => "partition parent primary key",
        }
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, non-empty identity column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColumnSet {
    columns: Vec<String>,
    source: KeySource,
}

impl KeyColumnSet {
    /// `None` for an empty column list.
    pub fn new(columns: Vec<String>, source: KeySource) -> Option<Self> {
        if columns.is_empty() {
            None
        } else {
            Some(Self { columns, source })
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// Run the key cascade for `schema.table`.
///
/// Sources after the first non-empty one are not queried.
pub fn resolve_keys<C: Catalog + ?Sized>(
    catalog: &mut C,
    schema: &str,
    table: &str,
) -> Result<KeyColumnSet, GenError> {
    let keys = match KeyColumnSet::new(
        catalog.primary_key_columns(schema, table)?,
        KeySource::PrimaryKey,
    ) {
        Some(keys) => keys,
        None => match KeyColumnSet::new(
            catalog.unique_key_columns(schema, table)?,
            KeySource::Unique,
        ) {
            Some(keys) => keys,
            None => KeyColumnSet::new(
                catalog.partition_parent_key_columns(schema, table)?,
                KeySource::PartitionParent,
            )
            .ok_or_else(|| GenError::MissingIdentity {
                schema: schema.to_string(),
                table: table.to_string(),
            })?,
        },
    };

    debug!(%schema, %table, source = %keys.source(), columns = ?keys.columns(), "resolved identity");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RawColumn, StaticCatalog, StaticTable};

    fn columns() -> Vec<RawColumn> {
        vec![
            RawColumn::new("tenant_id", "int8"),
            RawColumn::new("id", "int8"),
            RawColumn::new("email", "text"),
        ]
    }

    fn resolve(table: StaticTable) -> Result<KeyColumnSet, GenError> {
        let mut catalog = StaticCatalog::new().with_table("public", "t", table);
        resolve_keys(&mut catalog, "public", "t")
    }

    #[test]
    fn test_primary_key_wins() {
        let keys = resolve(
            StaticTable::new(columns())
                .primary_key(&["tenant_id", "id"])
                .unique("t_email_key", &["email"])
                .partition_of(&["id"]),
        )
        .unwrap();
        assert_eq!(keys.columns(), ["tenant_id", "id"]);
        assert_eq!(keys.source(), KeySource::PrimaryKey);
        assert!(keys.is_composite());
    }

    #[test]
    fn test_unique_fallback_smallest_name() {
        let keys = resolve(
            StaticTable::new(columns())
                .unique("t_tenant_email_key", &["tenant_id", "email"])
                .unique("t_b_key", &["email"]),
        )
        .unwrap();
        assert_eq!(keys.columns(), ["email"]);
        assert_eq!(keys.source(), KeySource::Unique);
    }

    #[test]
    fn test_partition_parent_fallback() {
        let keys = resolve(StaticTable::new(columns()).partition_of(&["id", "tenant_id"])).unwrap();
        assert_eq!(keys.columns(), ["id", "tenant_id"]);
        assert_eq!(keys.source(), KeySource::PartitionParent);
    }

    #[test]
    fn test_no_identity_is_error() {
        let err = resolve(StaticTable::new(columns())).unwrap_err();
        assert!(matches!(err, GenError::MissingIdentity { .. }));
        let message = err.to_string();
        assert!(message.contains("public.t"));
        assert!(message.contains("unique"));
    }

    #[test]
    fn test_stops_at_first_source() {
        let mut catalog = StaticCatalog::new().with_table(
            "public",
            "t",
            StaticTable::new(columns()).primary_key(&["id"]),
        );
        resolve_keys(&mut catalog, "public", "t").unwrap();
        let queries: Vec<_> = catalog.calls().iter().map(|(q, _)| *q).collect();
        assert_eq!(queries, ["primary_key"]);
    }

    #[test]
    fn test_catalog_error_propagates() {
        let mut catalog = StaticCatalog::new()
            .with_table("public", "t", StaticTable::new(columns()))
            .fail_on("unique_key", "t");
        let err = resolve_keys(&mut catalog, "public", "t").unwrap_err();
        assert!(matches!(err, GenError::Catalog(_)));
    }

    #[test]
    fn test_empty_set_rejected() {
        assert!(KeyColumnSet::new(vec![], KeySource::PrimaryKey).is_none());
    }
}
