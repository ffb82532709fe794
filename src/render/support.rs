//! Package-wide support modules: `var.rs` and `base_field_gen.rs`

use std::fmt::{self, Write as _};

use super::{BASE_FIELD_FILE, GENERATOR, RenderContext, Rendered, VAR_FILE, render};
use crate::error::Result;
use crate::typemap::FieldKind;

/// Kinds whose columns support range comparisons.
const ORDERED_KINDS: &[FieldKind] = &[
    FieldKind::Int64,
    FieldKind::Float64,
    FieldKind::String,
    FieldKind::Decimal,
    FieldKind::Time,
];

/// `var.rs`: error types shared by every model of the package.
pub fn render_var(ctx: &RenderContext) -> Result<Rendered> {
    render(VAR_FILE.to_string(), |out| {
        writeln!(out, "//! Errors shared by the `{}` models.", ctx.package)?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Created once by {GENERATOR}; this file is yours to edit and is never overwritten."
        )?;
        out.push_str(VAR_BODY);
        Ok(())
    })
}

const VAR_BODY: &str = r#"
use std::fmt;

/// Model operation errors
#[derive(Debug)]
pub enum ModelError {
    /// No row matched the key
    NotFound,
    /// Query or row decoding failed
    Db(postgres::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("row not found"),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Db(e) => Some(e),
        }
    }
}

impl From<postgres::Error> for ModelError {
    fn from(e: postgres::Error) -> Self {
        Self::Db(e)
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
"#;

/// `base_field_gen.rs`: field kinds, typed column handles and the select builder.
pub fn render_base_field(ctx: &RenderContext) -> Result<Rendered> {
    render(BASE_FIELD_FILE.to_string(), |out| {
        writeln!(out, "//! Query building blocks for the `{}` models.", ctx.package)?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Generated by {GENERATOR} {}; do not edit, this file is rewritten on every run.",
            super::VERSION
        )?;
        writeln!(out, "//!")?;
        writeln!(
            out,
            "//! Decimal and timestamp columns need `rust_decimal` with `db-postgres` and"
        )?;
        writeln!(out, "//! `postgres` with `with-chrono-0_4`.")?;
        writeln!(out)?;
        writeln!(out, "#![allow(dead_code)]")?;
        write_kinds(out)?;
        out.push_str(BASE_FIELD_BODY);
        Ok(())
    })
}

fn write_kinds(out: &mut String) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "/// Column kinds, used to pick the operations a column supports.")?;
    writeln!(out, "pub mod kind {{")?;
    writeln!(out, "    /// Kinds supporting `<`, `<=`, `>`, `>=` and `BETWEEN`.")?;
    writeln!(out, "    pub trait Ordered {{}}")?;
    for kind in FieldKind::ALL {
        writeln!(out)?;
        writeln!(out, "    #[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
        writeln!(out, "    pub struct {kind};")?;
        if ORDERED_KINDS.contains(kind) {
            writeln!(out, "    impl Ordered for {kind} {{}}")?;
        }
    }
    writeln!(out, "}}")
}

const BASE_FIELD_BODY: &str = r#"
use std::marker::PhantomData;

use postgres::types::ToSql;

type Value = Box<dyn ToSql + Sync>;

/// Bound parameters of a rendered statement, in placeholder order.
pub type Params<'a> = Vec<&'a (dyn ToSql + Sync)>;

fn bind<'a>(sql: &mut String, params: &mut Params<'a>, value: &'a Value, cast: &str) {
    params.push(value.as_ref());
    sql.push('$');
    sql.push_str(&params.len().to_string());
    sql.push_str(cast);
}

fn quoted(sql: &mut String, column: &str) {
    sql.push('"');
    sql.push_str(&column.replace('"', "\"\""));
    sql.push('"');
}

#[derive(Debug)]
enum Expr {
    Compare {
        column: &'static str,
        cast: &'static str,
        op: &'static str,
        value: Value,
    },
    Like {
        column: &'static str,
        op: &'static str,
        pattern: Value,
    },
    In {
        column: &'static str,
        cast: &'static str,
        values: Vec<Value>,
        negated: bool,
    },
    Between {
        column: &'static str,
        cast: &'static str,
        low: Value,
        high: Value,
    },
    Null {
        column: &'static str,
        negated: bool,
    },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

/// A `WHERE` predicate with its bound values.
#[derive(Debug)]
pub struct Condition(Expr);

impl Condition {
    /// Conjunction; `TRUE` when empty.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self(Expr::All(conditions.into_iter().collect()))
    }

    /// Disjunction; `FALSE` when empty.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self(Expr::Any(conditions.into_iter().collect()))
    }

    pub fn and(self, other: Condition) -> Self {
        Self::all([self, other])
    }

    pub fn or(self, other: Condition) -> Self {
        Self::any([self, other])
    }

    pub fn negate(self) -> Self {
        Self(Expr::Not(Box::new(self)))
    }

    /// Append the predicate to `sql`, numbering placeholders after `params`.
    pub fn render<'a>(&'a self, sql: &mut String, params: &mut Params<'a>) {
        match &self.0 {
            Expr::Compare {
                column,
                cast,
                op,
                value,
            } => {
                quoted(sql, column);
                sql.push(' ');
                sql.push_str(op);
                sql.push(' ');
                bind(sql, params, value, cast);
            }
            Expr::Like {
                column,
                op,
                pattern,
            } => {
                quoted(sql, column);
                sql.push_str("::text ");
                sql.push_str(op);
                sql.push(' ');
                bind(sql, params, pattern, "");
            }
            Expr::In {
                column,
                cast,
                values,
                negated,
            } => {
                if values.is_empty() {
                    sql.push_str(if *negated { "TRUE" } else { "FALSE" });
                    return;
                }
                quoted(sql, column);
                sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    bind(sql, params, value, cast);
                }
                sql.push(')');
            }
            Expr::Between {
                column,
                cast,
                low,
                high,
            } => {
                quoted(sql, column);
                sql.push_str(" BETWEEN ");
                bind(sql, params, low, cast);
                sql.push_str(" AND ");
                bind(sql, params, high, cast);
            }
            Expr::Null { column, negated } => {
                quoted(sql, column);
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::All(conditions) => join(sql, params, conditions, " AND ", "TRUE"),
            Expr::Any(conditions) => join(sql, params, conditions, " OR ", "FALSE"),
            Expr::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, params);
                sql.push(')');
            }
        }
    }
}

fn join<'a>(
    sql: &mut String,
    params: &mut Params<'a>,
    conditions: &'a [Condition],
    separator: &str,
    empty: &str,
) {
    match conditions {
        [] => sql.push_str(empty),
        [only] => only.render(sql, params),
        _ => {
            for (i, condition) in conditions.iter().enumerate() {
                if i > 0 {
                    sql.push_str(separator);
                }
                sql.push('(');
                condition.render(sql, params);
                sql.push(')');
            }
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    column: &'static str,
    descending: bool,
}

/// Typed handle for a scalar column.
///
/// `T` is the bound value type, `K` the column kind from [`kind`].
#[derive(Debug)]
pub struct Field<T, K> {
    column: &'static str,
    cast: &'static str,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T, K> Clone for Field<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K> Copy for Field<T, K> {}

impl<T, K> Field<T, K> {
    /// `cast` is appended to every placeholder bound for this column.
    pub const fn new(column: &'static str, cast: &'static str) -> Self {
        Self {
            column,
            cast,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.column
    }

    pub fn is_null(&self) -> Condition {
        Condition(Expr::Null {
            column: self.column,
            negated: false,
        })
    }

    pub fn is_not_null(&self) -> Condition {
        Condition(Expr::Null {
            column: self.column,
            negated: true,
        })
    }

    pub fn asc(&self) -> Order {
        Order {
            column: self.column,
            descending: false,
        }
    }

    pub fn desc(&self) -> Order {
        Order {
            column: self.column,
            descending: true,
        }
    }
}

impl<T: ToSql + Sync + 'static, K> Field<T, K> {
    fn compare(&self, op: &'static str, value: T) -> Condition {
        Condition(Expr::Compare {
            column: self.column,
            cast: self.cast,
            op,
            value: Box::new(value),
        })
    }

    pub fn eq(&self, value: T) -> Condition {
        self.compare("=", value)
    }

    pub fn ne(&self, value: T) -> Condition {
        self.compare("<>", value)
    }

    /// `IN (...)`; an empty list matches nothing.
    pub fn in_list(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.membership(values, false)
    }

    /// `NOT IN (...)`; an empty list matches everything.
    pub fn not_in_list(&self, values: impl IntoIterator<Item = T>) -> Condition {
        self.membership(values, true)
    }

    fn membership(&self, values: impl IntoIterator<Item = T>, negated: bool) -> Condition {
        Condition(Expr::In {
            column: self.column,
            cast: self.cast,
            values: values
                .into_iter()
                .map(|value| Box::new(value) as Value)
                .collect(),
            negated,
        })
    }
}

impl<T: ToSql + Sync + 'static, K: kind::Ordered> Field<T, K> {
    pub fn gt(&self, value: T) -> Condition {
        self.compare(">", value)
    }

    pub fn ge(&self, value: T) -> Condition {
        self.compare(">=", value)
    }

    pub fn lt(&self, value: T) -> Condition {
        self.compare("<", value)
    }

    pub fn le(&self, value: T) -> Condition {
        self.compare("<=", value)
    }

    pub fn between(&self, low: T, high: T) -> Condition {
        Condition(Expr::Between {
            column: self.column,
            cast: self.cast,
            low: Box::new(low),
            high: Box::new(high),
        })
    }
}

impl Field<String, kind::String> {
    pub fn like(&self, pattern: impl Into<String>) -> Condition {
        self.pattern("LIKE", pattern.into())
    }

    pub fn ilike(&self, pattern: impl Into<String>) -> Condition {
        self.pattern("ILIKE", pattern.into())
    }

    fn pattern(&self, op: &'static str, pattern: String) -> Condition {
        Condition(Expr::Like {
            column: self.column,
            op,
            pattern: Box::new(pattern),
        })
    }
}

/// Typed handle for an array column with elements of type `T`.
#[derive(Debug)]
pub struct ArrayField<T, K> {
    column: &'static str,
    cast: &'static str,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T, K> Clone for ArrayField<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K> Copy for ArrayField<T, K> {}

impl<T, K> ArrayField<T, K> {
    pub const fn new(column: &'static str, cast: &'static str) -> Self {
        Self {
            column,
            cast,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.column
    }

    pub fn is_null(&self) -> Condition {
        Condition(Expr::Null {
            column: self.column,
            negated: false,
        })
    }

    pub fn is_not_null(&self) -> Condition {
        Condition(Expr::Null {
            column: self.column,
            negated: true,
        })
    }
}

impl<T: 'static, K> ArrayField<T, K>
where
    Vec<T>: ToSql + Sync,
{
    fn compare(&self, op: &'static str, values: Vec<T>) -> Condition {
        Condition(Expr::Compare {
            column: self.column,
            cast: self.cast,
            op,
            value: Box::new(values),
        })
    }

    pub fn eq(&self, values: Vec<T>) -> Condition {
        self.compare("=", values)
    }

    /// `@>`: the column holds every element of `values`.
    pub fn contains(&self, values: Vec<T>) -> Condition {
        self.compare("@>", values)
    }

    /// `<@`: every element of the column is in `values`.
    pub fn contained_by(&self, values: Vec<T>) -> Condition {
        self.compare("<@", values)
    }

    /// `&&`: at least one element in common.
    pub fn overlaps(&self, values: Vec<T>) -> Condition {
        self.compare("&&", values)
    }
}

/// Filter, order and paging for a `SELECT`.
#[derive(Debug, Default)]
pub struct SelectBuilder {
    filter: Option<Condition>,
    order: Vec<Order>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; repeated calls are combined with `AND`.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// `head` followed by the `WHERE` clause only.
    pub fn build_filter<'a>(&'a self, head: &str) -> (String, Params<'a>) {
        let mut sql = String::from(head);
        let mut params = Params::new();
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            filter.render(&mut sql, &mut params);
        }
        (sql, params)
    }

    /// `head` followed by `WHERE`, `ORDER BY`, `LIMIT` and `OFFSET`.
    pub fn build<'a>(&'a self, head: &str) -> (String, Params<'a>) {
        let (mut sql, params) = self.build_filter(head);
        for (i, order) in self.order.iter().enumerate() {
            sql.push_str(if i == 0 { " ORDER BY " } else { ", " });
            quoted(&mut sql, order.column);
            sql.push_str(if order.descending { " DESC" } else { " ASC" });
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_string());
        }
        if let Some(offset) = self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_string());
        }
        (sql, params)
    }
}
"#;
