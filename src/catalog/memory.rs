//! In-memory catalog with fixed facts per table

use std::collections::HashMap;

use super::{Catalog, CatalogError, CatalogResult, RawColumn};

/// Facts for one table, as a catalog would report them.
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    pub columns: Vec<RawColumn>,
    pub primary_key: Vec<String>,
    /// `(constraint name, columns)`; the smallest name wins.
    pub uniques: Vec<(String, Vec<String>)>,
    pub partition_parent_key: Vec<String>,
    /// Columns per index, duplicates allowed across indexes.
    pub indexes: Vec<Vec<String>>,
}

impl StaticTable {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self {
            columns,
            ..Default::default()
        }
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = to_owned(columns);
        self
    }

    pub fn unique(mut self, name: &str, columns: &[&str]) -> Self {
        self.uniques.push((name.to_string(), to_owned(columns)));
        self
    }

    pub fn partition_of(mut self, parent_key: &[&str]) -> Self {
        self.partition_parent_key = to_owned(parent_key);
        self
    }

    pub fn index(mut self, columns: &[&str]) -> Self {
        self.indexes.push(to_owned(columns));
        self
    }
}

fn to_owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// [`Catalog`] over a fixed set of tables.
///
/// Unknown tables report no columns, like a live catalog does. A query name
/// registered with [`StaticCatalog::fail_on`] returns an error instead.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: HashMap<(String, String), StaticTable>,
    failing: Vec<(&'static str, String)>,
    calls: Vec<(&'static str, String)>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, schema: &str, table: &str, facts: StaticTable) -> Self {
        self.insert(schema, table, facts);
        self
    }

    pub fn insert(&mut self, schema: &str, table: &str, facts: StaticTable) {
        self.tables
            .insert((schema.to_string(), table.to_string()), facts);
    }

    /// Make `query` fail for `table`.
    pub fn fail_on(mut self, query: &'static str, table: &str) -> Self {
        self.failing.push((query, table.to_string()));
        self
    }

    /// Queries issued so far, in order.
    pub fn calls(&self) -> &[(&'static str, String)] {
        &self.calls
    }

    fn lookup(
        &mut self,
        query: &'static str,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Option<&StaticTable>> {
        self.calls.push((query, table.to_string()));
        if self.failing.iter().any(|(q, t)| *q == query && t == table) {
            return Err(CatalogError::new(
                query,
                format!("simulated failure for {schema}.{table}"),
            ));
        }
        Ok(self.tables.get(&(schema.to_string(), table.to_string())))
    }
}

impl Catalog for StaticCatalog {
    fn columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<RawColumn>> {
        Ok(self
            .lookup("columns", schema, table)?
            .map(|t| {
                t.columns
                    .iter()
                    .map(|c| RawColumn {
                        comment: String::new(),
                        ..c.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn column_comments(
        &mut self,
        schema: &str,
        table: &str,
    ) -> CatalogResult<HashMap<String, String>> {
        Ok(self
            .lookup("column_comments", schema, table)?
            .map(|t| {
                t.columns
                    .iter()
                    .filter(|c| !c.comment.is_empty())
                    .map(|c| (c.name.clone(), c.comment.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn primary_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .lookup("primary_key", schema, table)?
            .map(|t| t.primary_key.clone())
            .unwrap_or_default())
    }

    fn unique_key_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .lookup("unique_key", schema, table)?
            .and_then(|t| t.uniques.iter().min_by(|a, b| a.0.cmp(&b.0)))
            .map(|(_, columns)| columns.clone())
            .unwrap_or_default())
    }

    fn partition_parent_key_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> CatalogResult<Vec<String>> {
        Ok(self
            .lookup("partition_parent_key", schema, table)?
            .map(|t| t.partition_parent_key.clone())
            .unwrap_or_default())
    }

    fn indexed_columns(&mut self, schema: &str, table: &str) -> CatalogResult<Vec<String>> {
        let mut names: Vec<String> = self
            .lookup("indexed_columns", schema, table)?
            .map(|t| t.indexes.iter().flatten().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_table_has_no_columns() {
        let mut catalog = StaticCatalog::new();
        assert!(catalog.columns("public", "missing").unwrap().is_empty());
    }

    #[test]
    fn test_first_unique_by_name() {
        let table = StaticTable::new(vec![RawColumn::new("a", "text"), RawColumn::new("b", "text")])
            .unique("users_z_key", &["b"])
            .unique("users_a_key", &["a"]);
        let mut catalog = StaticCatalog::new().with_table("public", "users", table);
        assert_eq!(catalog.unique_key_columns("public", "users").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_indexed_columns_distinct_sorted() {
        let table = StaticTable::new(vec![])
            .index(&["email", "created_at"])
            .index(&["email"]);
        let mut catalog = StaticCatalog::new().with_table("public", "users", table);
        assert_eq!(
            catalog.indexed_columns("public", "users").unwrap(),
            vec!["created_at", "email"]
        );
    }

    #[test]
    fn test_fail_on() {
        let mut catalog = StaticCatalog::new().fail_on("primary_key", "users");
        let err = catalog.primary_key_columns("public", "users").unwrap_err();
        assert_eq!(err.query, "primary_key");
        assert!(catalog.primary_key_columns("public", "other").is_ok());
    }
}
