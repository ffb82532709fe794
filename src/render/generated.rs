//! `<base>_model_gen.rs`: row struct, column handles and CRUD over one table

use std::fmt::{self, Write as _};

use super::{GENERATOR, RenderContext, Rendered, VERSION, doc_lines, generated_file_name, lit, render, wrapper_file_name};
use crate::error::Result;
use crate::model::{FieldModel, TableModel, quote_ident};

/// Render the always-regenerated model module for `model`.
pub fn render_generated(ctx: &RenderContext, model: &TableModel) -> Result<Rendered> {
    render(generated_file_name(model), |out| {
        write_header(out, ctx, model)?;
        write_row(out, model)?;
        write_columns(out, model)?;
        if !model.indexed.is_empty() {
            write_indexed(out, model)?;
        }
        write_model(out, model)
    })
}

fn write_header(out: &mut String, ctx: &RenderContext, m: &TableModel) -> fmt::Result {
    writeln!(
        out,
        "//! `{}.{}` model, generated by {GENERATOR} {VERSION} at {}.",
        m.schema,
        m.table,
        ctx.timestamp()
    )?;
    writeln!(out, "//!")?;
    writeln!(
        out,
        "//! Part of the `{}` package. Do not edit: this file is rewritten on every run.",
        ctx.package
    )?;
    writeln!(
        out,
        "//! Custom queries belong in `{}`.",
        wrapper_file_name(m)
    )?;
    writeln!(out)?;
    writeln!(out, "#![allow(unused_imports, dead_code)]")?;
    writeln!(out)?;
    for path in &m.imports {
        writeln!(out, "use {path};")?;
    }
    Ok(())
}

fn write_row(out: &mut String, m: &TableModel) -> fmt::Result {
    let ty = &m.type_name;

    writeln!(out)?;
    writeln!(out, "/// Row of `{}.{}`.", m.schema, m.table)?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq)]")?;
    writeln!(out, "pub struct {ty} {{")?;
    for f in &m.fields {
        doc_lines(out, &f.comment)?;
        writeln!(out, "    pub {}: {},", f.ident, f.rust_type())?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl {ty} {{")?;
    writeln!(out, "    pub const SCHEMA: &'static str = {};", lit(&m.schema))?;
    writeln!(out, "    pub const TABLE: &'static str = {};", lit(&m.table))?;
    writeln!(out, "    /// Column names in table order.")?;
    writeln!(
        out,
        "    pub const COLUMNS: &'static [&'static str] = &[{}];",
        lits(m.fields.iter().map(|f| f.column.as_str()))
    )?;
    writeln!(out, "    /// Identity columns, in key order.")?;
    writeln!(
        out,
        "    pub const KEY: &'static [&'static str] = &[{}];",
        lits(m.keys.columns().iter().map(String::as_str))
    )?;
    writeln!(out)?;
    writeln!(out, "    /// Decode a row read with this model's select list.")?;
    writeln!(
        out,
        "    pub fn from_row(row: &Row) -> Result<Self, postgres::Error> {{"
    )?;
    writeln!(out, "        Ok(Self {{")?;
    for f in &m.fields {
        writeln!(out, "            {}: row.try_get({})?,", f.ident, lit(&f.column))?;
    }
    writeln!(out, "        }})")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    let key_fields: Vec<&FieldModel> = m.key_fields().collect();
    let pattern = format!(
        "{}.{}({})",
        escape_braces(&m.schema),
        escape_braces(&m.table),
        key_fields
            .iter()
            .map(|f| format!("{}={{:?}}", escape_braces(&f.column)))
            .collect::<Vec<_>>()
            .join(", ")
    );
    writeln!(out)?;
    writeln!(out, "impl fmt::Display for {ty} {{")?;
    writeln!(
        out,
        "    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{"
    )?;
    write!(out, "        write!(f, {}", lit(&pattern))?;
    for f in &key_fields {
        write!(out, ", self.{}", f.ident)?;
    }
    writeln!(out, ")")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}

fn write_columns(out: &mut String, m: &TableModel) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "/// Typed column handles for `{}.{}`.", m.schema, m.table)?;
    writeln!(out, "#[derive(Debug, Clone, Copy)]")?;
    writeln!(out, "pub struct {}Columns;", m.type_name)?;
    writeln!(out)?;
    writeln!(out, "impl {}Columns {{", m.type_name)?;
    for f in &m.fields {
        let handle = if f.kind.is_array() { "ArrayField" } else { "Field" };
        let bound = f.value.element().unwrap_or(f.value).rust_type();
        writeln!(
            out,
            "    pub const {}: {handle}<{bound}, kind::{}> = {handle}::new({}, {});",
            f.const_name,
            f.kind,
            lit(&f.column),
            lit(&f.param_cast())
        )?;
    }
    writeln!(out, "}}")
}

fn write_indexed(out: &mut String, m: &TableModel) -> fmt::Result {
    let name = format!("{}Indexed", m.type_name);

    writeln!(out)?;
    writeln!(
        out,
        "/// Equality filter over the indexed columns of `{}.{}`; `None` fields are ignored.",
        m.schema, m.table
    )?;
    writeln!(out, "#[derive(Debug, Clone, Default, PartialEq)]")?;
    writeln!(out, "pub struct {name} {{")?;
    for f in &m.indexed {
        writeln!(out, "    pub {}: Option<{}>,", f.ident, f.value.rust_type())?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {name} {{")?;
    writeln!(out, "    /// `AND` of the set fields; `TRUE` when none is set.")?;
    writeln!(out, "    pub fn into_condition(self) -> Condition {{")?;
    writeln!(out, "        let mut conditions = Vec::new();")?;
    for f in &m.indexed {
        writeln!(out, "        if let Some(value) = self.{} {{", f.ident)?;
        writeln!(
            out,
            "            conditions.push({}Columns::{}.eq(value));",
            m.type_name, f.const_name
        )?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "        Condition::all(conditions)")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")
}

fn write_model(out: &mut String, m: &TableModel) -> fmt::Result {
    let ty = &m.type_name;
    let sql = Statements::new(m);

    writeln!(out)?;
    writeln!(out, "/// Generated access to `{}.{}`.", m.schema, m.table)?;
    writeln!(out, "#[derive(Debug, Clone, Copy, Default)]")?;
    writeln!(out, "pub struct Default{ty}Model;")?;
    writeln!(out)?;
    writeln!(out, "impl Default{ty}Model {{")?;
    writeln!(out, "    const SELECT_SQL: &'static str = {};", lit(&sql.select))?;
    writeln!(out, "    const COUNT_SQL: &'static str = {};", lit(&sql.count))?;
    writeln!(out, "    const INSERT_SQL: &'static str = {};", lit(&sql.insert))?;
    writeln!(out, "    const FIND_ONE_SQL: &'static str = {};", lit(&sql.find_one))?;
    if let Some(update) = &sql.update {
        writeln!(out, "    const UPDATE_SQL: &'static str = {};", lit(update))?;
    }
    writeln!(out, "    const DELETE_SQL: &'static str = {};", lit(&sql.delete))?;
    writeln!(out)?;
    writeln!(out, "    pub const fn new() -> Self {{")?;
    writeln!(out, "        Self")?;
    writeln!(out, "    }}")?;

    let key_args: String = m
        .key_params
        .iter()
        .map(|p| format!(", {}: {}", p.ident, p.value.param_type()))
        .collect();
    let key_refs = refs(m.key_params.iter().map(|p| p.ident.clone()));

    // insert
    writeln!(out)?;
    if m.auto_set.is_empty() {
        writeln!(out, "    /// Insert `row` and return the stored row.")?;
    } else {
        writeln!(
            out,
            "    /// Insert `row` and return the stored row; database-assigned columns ({}) take their defaults.",
            m.auto_set
                .iter()
                .map(|c| format!("`{c}`"))
                .collect::<Vec<_>>()
                .join(", ")
        )?;
    }
    let row = if m.insertable.is_empty() { "_row" } else { "row" };
    writeln!(
        out,
        "    pub fn insert<C: GenericClient>(&self, client: &mut C, {row}: &{ty}) -> ModelResult<{ty}> {{"
    )?;
    writeln!(
        out,
        "        let stored = client.query_one(Self::INSERT_SQL, &[{}])?;",
        refs(m.insertable.iter().map(|f| format!("row.{}", f.ident)))
    )?;
    writeln!(out, "        Ok({ty}::from_row(&stored)?)")?;
    writeln!(out, "    }}")?;

    // find_one
    writeln!(out)?;
    writeln!(out, "    /// Fetch the row with the given key.")?;
    writeln!(
        out,
        "    pub fn find_one<C: GenericClient>(&self, client: &mut C{key_args}) -> ModelResult<{ty}> {{"
    )?;
    writeln!(
        out,
        "        match client.query_opt(Self::FIND_ONE_SQL, &[{key_refs}])? {{"
    )?;
    writeln!(out, "            Some(row) => Ok({ty}::from_row(&row)?),")?;
    writeln!(out, "            None => Err(ModelError::NotFound),")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    // update
    if sql.update.is_some() {
        let params = m
            .updatable
            .iter()
            .chain(m.key_fields())
            .map(|f| format!("row.{}", f.ident));
        writeln!(out)?;
        writeln!(
            out,
            "    /// Write the updatable columns of `row`, addressed by its key, and return the stored row."
        )?;
        writeln!(
            out,
            "    pub fn update<C: GenericClient>(&self, client: &mut C, row: &{ty}) -> ModelResult<{ty}> {{"
        )?;
        writeln!(
            out,
            "        match client.query_opt(Self::UPDATE_SQL, &[{}])? {{",
            refs(params)
        )?;
        writeln!(out, "            Some(stored) => Ok({ty}::from_row(&stored)?),")?;
        writeln!(out, "            None => Err(ModelError::NotFound),")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
    }

    // delete
    writeln!(out)?;
    writeln!(
        out,
        "    /// Delete the row with the given key; returns the number of rows removed."
    )?;
    writeln!(
        out,
        "    pub fn delete<C: GenericClient>(&self, client: &mut C{key_args}) -> ModelResult<u64> {{"
    )?;
    writeln!(
        out,
        "        Ok(client.execute(Self::DELETE_SQL, &[{key_refs}])?)"
    )?;
    writeln!(out, "    }}")?;

    // find
    writeln!(out)?;
    writeln!(out, "    /// Rows matching `select`.")?;
    writeln!(
        out,
        "    pub fn find<C: GenericClient>(&self, client: &mut C, select: &SelectBuilder) -> ModelResult<Vec<{ty}>> {{"
    )?;
    writeln!(out, "        let (sql, params) = select.build(Self::SELECT_SQL);")?;
    writeln!(out, "        let rows = client.query(sql.as_str(), &params)?;")?;
    writeln!(out, "        rows.iter()")?;
    writeln!(
        out,
        "            .map(|row| {ty}::from_row(row).map_err(ModelError::from))"
    )?;
    writeln!(out, "            .collect()")?;
    writeln!(out, "    }}")?;

    // count
    writeln!(out)?;
    writeln!(
        out,
        "    /// Number of rows matching the filter of `select`; order and paging are ignored."
    )?;
    writeln!(
        out,
        "    pub fn count<C: GenericClient>(&self, client: &mut C, select: &SelectBuilder) -> ModelResult<i64> {{"
    )?;
    writeln!(out, "        let (sql, params) = select.build_filter(Self::COUNT_SQL);")?;
    writeln!(out, "        let row = client.query_one(sql.as_str(), &params)?;")?;
    writeln!(out, "        Ok(row.try_get(0)?)")?;
    writeln!(out, "    }}")?;

    // find_by_indexed
    if !m.indexed.is_empty() {
        writeln!(out)?;
        writeln!(out, "    /// Rows equal to every set field of `filter`.")?;
        writeln!(
            out,
            "    pub fn find_by_indexed<C: GenericClient>(&self, client: &mut C, filter: {ty}Indexed) -> ModelResult<Vec<{ty}>> {{"
        )?;
        writeln!(
            out,
            "        self.find(client, &SelectBuilder::new().filter(filter.into_condition()))"
        )?;
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}}")
}

/// SQL text of the generated statements.
#[derive(Debug)]
struct Statements {
    select: String,
    count: String,
    insert: String,
    find_one: String,
    /// `None` when no column is updatable
    update: Option<String>,
    delete: String,
}

impl Statements {
    fn new(m: &TableModel) -> Self {
        let table = m.qualified_name();
        let select_list = m
            .fields
            .iter()
            .map(FieldModel::select_expr)
            .collect::<Vec<_>>()
            .join(", ");
        let key_fields: Vec<&FieldModel> = m.key_fields().collect();

        let insert = if m.insertable.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES RETURNING {select_list}")
        } else {
            format!(
                "INSERT INTO {table} ({}) VALUES ({}) RETURNING {select_list}",
                m.insertable
                    .iter()
                    .map(|f| quote_ident(&f.column))
                    .collect::<Vec<_>>()
                    .join(", "),
                m.insertable
                    .iter()
                    .enumerate()
                    .map(|(i, f)| f.placeholder(i + 1))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        let update = (!m.updatable.is_empty()).then(|| {
            format!(
                "UPDATE {table} SET {} WHERE {} RETURNING {select_list}",
                m.updatable
                    .iter()
                    .enumerate()
                    .map(|(i, f)| format!("{} = {}", quote_ident(&f.column), f.placeholder(i + 1)))
                    .collect::<Vec<_>>()
                    .join(", "),
                key_predicate(&key_fields, m.updatable.len() + 1)
            )
        });

        Self {
            select: format!("SELECT {select_list} FROM {table}"),
            count: format!("SELECT COUNT(*) FROM {table}"),
            insert,
            find_one: format!(
                "SELECT {select_list} FROM {table} WHERE {}",
                key_predicate(&key_fields, 1)
            ),
            update,
            delete: format!("DELETE FROM {table} WHERE {}", key_predicate(&key_fields, 1)),
        }
    }
}

/// `"a" = $n AND "b" = $n+1`
fn key_predicate(keys: &[&FieldModel], first: usize) -> String {
    keys.iter()
        .enumerate()
        .map(|(i, f)| format!("{} = {}", quote_ident(&f.column), f.placeholder(first + i)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn lits<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.map(lit).collect::<Vec<_>>().join(", ")
}

fn refs(values: impl Iterator<Item = String>) -> String {
    values.map(|v| format!("&{v}")).collect::<Vec<_>>().join(", ")
}

fn escape_braces(s: &str) -> String {
    s.replace('{', "{{").replace('}', "}}")
}
