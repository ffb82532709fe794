//! Table introspection and model derivation
//!
//! [`introspect_table`] reads the raw facts for one table from a [`Catalog`],
//! resolves its identity and hands everything to [`derive_table_model`], which
//! is pure and builds the [`TableModel`] consumed by the renderer.

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::{Catalog, RawColumn};
use crate::error::{GenError, Stage, TableError};
use crate::imports::infer_imports;
use crate::keys::{KeyColumnSet, resolve_keys};
use crate::model::{CREATED_AT_COLUMN, FieldModel, Param, TableModel, sql_type_name};
use crate::naming::{const_ident, file_base, rust_ident, to_camel, to_lower_camel};
use crate::typemap::{ValueType, map_catalog_type};

/// Introspect `schema.table` and derive its model.
///
/// Any catalog failure aborts the table; no partial model is produced.
pub fn introspect_table<C: Catalog + ?Sized>(
    catalog: &mut C,
    schema: &str,
    table: &str,
) -> Result<TableModel, TableError> {
    let fail = |stage: Stage| move |e: GenError| TableError::new(schema, table, stage, e);

    let mut columns = catalog
        .columns(schema, table)
        .map_err(GenError::from)
        .map_err(fail(Stage::Introspect))?;
    if columns.is_empty() {
        return Err(fail(Stage::Introspect)(GenError::TableNotFound {
            schema: schema.to_string(),
            table: table.to_string(),
        }));
    }

    let comments = catalog
        .column_comments(schema, table)
        .map_err(GenError::from)
        .map_err(fail(Stage::Introspect))?;
    for column in &mut columns {
        if let Some(comment) = comments.get(&column.name) {
            column.comment = comment.clone();
        }
    }

    let keys = resolve_keys(catalog, schema, table).map_err(fail(Stage::ResolveKeys))?;

    let indexed = catalog
        .indexed_columns(schema, table)
        .map_err(GenError::from)
        .map_err(fail(Stage::Introspect))?;

    debug!(
        %schema,
        %table,
        columns = columns.len(),
        indexed = indexed.len(),
        "introspected table"
    );

    Ok(derive_table_model(schema, table, &columns, keys, &indexed))
}

/// Database-assigned column: identity, or defaulted from `nextval(...)`.
pub fn is_auto_set(column: &RawColumn) -> bool {
    if column.is_identity {
        return true;
    }
    column.default.as_deref().is_some_and(|default| {
        default
            .trim_start()
            .get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("nextval("))
    })
}

/// Build the table model from already-fetched facts.
pub fn derive_table_model(
    schema: &str,
    table: &str,
    columns: &[RawColumn],
    keys: KeyColumnSet,
    indexed_columns: &[String],
) -> TableModel {
    let type_name = type_name(table);

    let mut auto_set: Vec<String> = columns
        .iter()
        .filter(|c| is_auto_set(c))
        .map(|c| c.name.clone())
        .collect();
    auto_set.sort();
    auto_set.dedup();

    let indexed_set: HashSet<&str> = indexed_columns.iter().map(String::as_str).collect();

    let mut fields: Vec<FieldModel> = columns.iter().map(field_model).collect();
    dedupe_idents(&mut fields);

    let insertable: Vec<FieldModel> = fields
        .iter()
        .filter(|f| !auto_set.contains(&f.column))
        .cloned()
        .collect();

    let updatable: Vec<FieldModel> = fields
        .iter()
        .filter(|f| {
            !auto_set.contains(&f.column)
                && !keys.contains(&f.column)
                && f.column != CREATED_AT_COLUMN
        })
        .cloned()
        .collect();

    let indexed: Vec<FieldModel> = fields
        .iter()
        .filter(|f| indexed_set.contains(f.column.as_str()))
        .cloned()
        .collect();

    let key_params: Vec<Param> = keys
        .columns()
        .iter()
        .map(|column| {
            let field = fields.iter().find(|f| &f.column == column);
            Param {
                column: column.clone(),
                name: to_lower_camel(column),
                ident: arg_ident(field.map_or_else(|| rust_ident(column), |f| f.ident.clone())),
                value: field.map_or(ValueType::String, |f| f.value),
                field: to_camel(column),
            }
        })
        .collect();

    let imports = infer_imports(fields.iter().map(|f| f.value));

    debug!(
        %table,
        insertable = insertable.len(),
        updatable = updatable.len(),
        indexed = indexed.len(),
        auto_set = ?auto_set,
        "derived table model"
    );

    TableModel {
        schema: schema.to_string(),
        table: table.to_string(),
        type_name,
        file_base: file_base(table),
        keys,
        key_params,
        auto_set,
        fields,
        insertable,
        updatable,
        indexed,
        imports,
    }
}

/// Names a generated model module imports or relies on from the prelude.
const TAKEN_TYPE_NAMES: &[&str] = &[
    "ArrayField",
    "Condition",
    "DateTime",
    "Decimal",
    "Field",
    "GenericClient",
    "ModelError",
    "ModelResult",
    "Option",
    "Result",
    "Row",
    "SelectBuilder",
    "Self",
    "String",
    "ToSql",
    "Utc",
    "Vec",
];

/// Row struct name for `table`, kept clear of imported names.
fn type_name(table: &str) -> String {
    let name = to_camel(table);
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Table{name}")
    } else if TAKEN_TYPE_NAMES.contains(&name.as_str()) {
        format!("{name}Record")
    } else {
        name
    }
}

/// Argument name in generated signatures; `client` is taken by the connection.
fn arg_ident(ident: String) -> String {
    if ident == "client" {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Columns such as `userId` and `user_id` share a snake case form; later
/// ones get a numeric suffix so struct fields and handles stay distinct.
fn dedupe_idents(fields: &mut [FieldModel]) {
    let mut idents = HashSet::new();
    let mut consts = HashSet::new();
    for field in fields {
        field.ident = unique(&field.ident, &mut idents);
        field.const_name = unique(&field.const_name, &mut consts);
    }
}

fn unique(name: &str, taken: &mut HashSet<String>) -> String {
    let base = name.strip_prefix("r#").unwrap_or(name);
    let mut candidate = name.to_string();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{base}_{n}");
        n += 1;
    }
    candidate
}

fn field_model(column: &RawColumn) -> FieldModel {
    let mapped = map_catalog_type(&column.udt_name);
    FieldModel {
        column: column.name.clone(),
        field: to_camel(&column.name),
        ident: rust_ident(&column.name),
        const_name: const_ident(&column.name),
        sql_type: sql_type_name(&column.udt_name),
        value: mapped.value,
        kind: mapped.kind,
        nullable: column.nullable,
        comment: column.comment.clone(),
    }
}
