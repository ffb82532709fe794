//! Normalized table model handed to the renderer

use std::collections::BTreeSet;

use crate::keys::KeyColumnSet;
use crate::typemap::{FieldKind, ValueType};

/// Convention column that is never updated once written.
pub const CREATED_AT_COLUMN: &str = "created_at";

/// One column of the table, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    /// Catalog column name
    pub column: String,
    /// Capitalized compound name (`user_id` → `UserId`)
    pub field: String,
    /// Rust struct field identifier (`user_id`, `r#type`)
    pub ident: String,
    /// Upper snake constant name for column handles
    pub const_name: String,
    /// Declared column type in SQL spelling (`int4`, `varchar[]`)
    pub sql_type: String,
    pub value: ValueType,
    pub kind: FieldKind,
    pub nullable: bool,
    pub comment: String,
}

impl FieldModel {
    /// Struct field type, `Option<T>` for nullable columns.
    pub fn rust_type(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.value.rust_type())
        } else {
            self.value.rust_type().to_string()
        }
    }

    /// Whether the declared type differs from the type the value binds to.
    pub fn needs_cast(&self) -> bool {
        self.sql_type != self.value.pg_type()
    }

    /// Select-list expression reading the column as its value type.
    pub fn select_expr(&self) -> String {
        let column = quote_ident(&self.column);
        if self.needs_cast() {
            format!("{column}::{} AS {column}", self.value.pg_type())
        } else {
            column
        }
    }

    /// Placeholder `$n`, cast through the bound type when needed.
    pub fn placeholder(&self, n: usize) -> String {
        format!("${n}{}", self.param_cast())
    }

    /// Suffix appended to a placeholder; empty when no cast is needed.
    pub fn param_cast(&self) -> String {
        if self.needs_cast() {
            format!("::{}::{}", self.value.pg_type(), self.sql_type)
        } else {
            String::new()
        }
    }
}

/// SQL spelling of a catalog `udt_name`; array types (`_int4`) become `int4[]`.
pub fn sql_type_name(udt_name: &str) -> String {
    let udt = udt_name.trim();
    match udt.strip_prefix('_') {
        Some(elem) => format!("{}[]", type_ident(elem)),
        None => type_ident(udt),
    }
}

fn type_ident(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain {
        name.to_string()
    } else {
        quote_ident(name)
    }
}

/// Typed lookup parameter for one identity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Catalog column name
    pub column: String,
    /// Lower-camel parameter name (`userId`)
    pub name: String,
    /// Snake case argument identifier used in generated signatures
    pub ident: String,
    pub value: ValueType,
    /// Capitalized field name (`UserId`)
    pub field: String,
}

/// Everything the templates need to know about one table.
#[derive(Debug, Clone)]
pub struct TableModel {
    pub schema: String,
    pub table: String,
    /// `order_items` → `OrderItems`
    pub type_name: String,
    pub file_base: String,
    pub keys: KeyColumnSet,
    pub key_params: Vec<Param>,
    /// Sorted names of columns the database assigns
    pub auto_set: Vec<String>,
    pub fields: Vec<FieldModel>,
    pub insertable: Vec<FieldModel>,
    pub updatable: Vec<FieldModel>,
    pub indexed: Vec<FieldModel>,
    /// Sorted `use` paths for the generated module
    pub imports: BTreeSet<String>,
}

impl TableModel {
    pub fn field(&self, column: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// `"schema"."table"` for use in SQL text.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(&self.schema),
            quote_ident(&self.table)
        )
    }

    /// Fields of the key columns, in key order.
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.keys.columns().iter().filter_map(|c| self.field(c))
    }
}

/// Double-quote a SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_sql_type_name() {
        assert_eq!(sql_type_name("int4"), "int4");
        assert_eq!(sql_type_name("_varchar"), "varchar[]");
        assert_eq!(sql_type_name("Mood"), "\"Mood\"");
    }

    fn field(column: &str, udt: &str) -> FieldModel {
        let mapped = crate::typemap::map_catalog_type(udt);
        FieldModel {
            column: column.into(),
            field: String::new(),
            ident: column.into(),
            const_name: column.to_uppercase(),
            sql_type: sql_type_name(udt),
            value: mapped.value,
            kind: mapped.kind,
            nullable: false,
            comment: String::new(),
        }
    }

    #[test]
    fn test_casts() {
        let id = field("id", "int8");
        assert!(!id.needs_cast());
        assert_eq!(id.select_expr(), "\"id\"");
        assert_eq!(id.placeholder(1), "$1");

        let small = field("n", "int4");
        assert_eq!(small.select_expr(), "\"n\"::int8 AS \"n\"");
        assert_eq!(small.placeholder(2), "$2::int8::int4");

        let tags = field("tags", "_varchar");
        assert_eq!(tags.placeholder(1), "$1::text[]::varchar[]");

        let shape = field("shape", "box");
        assert_eq!(shape.select_expr(), "\"shape\"::text AS \"shape\"");
    }

    #[test]
    fn test_nullable_rust_type() {
        let mut field = FieldModel {
            column: "created_at".into(),
            field: "CreatedAt".into(),
            ident: "created_at".into(),
            const_name: "CREATED_AT".into(),
            sql_type: "timestamptz".into(),
            value: ValueType::Time,
            kind: FieldKind::Time,
            nullable: false,
            comment: String::new(),
        };
        assert_eq!(field.rust_type(), "DateTime<Utc>");
        field.nullable = true;
        assert_eq!(field.rust_type(), "Option<DateTime<Utc>>");
    }
}
