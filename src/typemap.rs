//! Catalog type → Rust value type mapping
//!
//! PostgreSQL reports column types through `information_schema.columns.udt_name`,
//! where array types carry a leading underscore (`_int8`, `_text`). The mapping
//! is closed-form and fail-open: any type outside the table maps to `String`.

use std::fmt;

/// Rust value type of a generated struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueType {
    Int64,
    Bool,
    String,
    Bytes,
    Float64,
    Decimal,
    Time,
    Int64Array,
    StringArray,
    Float64Array,
    BoolArray,
}

impl ValueType {
    /// Rust spelling of the type as it appears in generated code.
    ///
    /// Temporal and decimal types are spelled with their imported names;
    /// see [`crate::imports`] for the matching `use` paths.
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::Int64 => "i64",
            Self::Bool => "bool",
            Self::String => "String",
            Self::Bytes => "Vec<u8>",
            Self::Float64 => "f64",
            Self::Decimal => "Decimal",
            Self::Time => "DateTime<Utc>",
            Self::Int64Array => "Vec<i64>",
            Self::StringArray => "Vec<String>",
            Self::Float64Array => "Vec<f64>",
            Self::BoolArray => "Vec<bool>",
        }
    }

    /// Argument type for key parameters: borrowed for owned buffers.
    pub const fn param_type(self) -> &'static str {
        match self {
            Self::String => "&str",
            Self::Bytes => "&[u8]",
            Self::Int64Array => "&[i64]",
            Self::StringArray => "&[String]",
            Self::Float64Array => "&[f64]",
            Self::BoolArray => "&[bool]",
            other => other.rust_type(),
        }
    }

    /// PostgreSQL type the Rust value type binds to directly.
    pub const fn pg_type(self) -> &'static str {
        match self {
            Self::Int64 => "int8",
            Self::Bool => "bool",
            Self::String => "text",
            Self::Bytes => "bytea",
            Self::Float64 => "float8",
            Self::Decimal => "numeric",
            Self::Time => "timestamptz",
            Self::Int64Array => "int8[]",
            Self::StringArray => "text[]",
            Self::Float64Array => "float8[]",
            Self::BoolArray => "bool[]",
        }
    }

    /// Element type for array value types.
    pub const fn element(self) -> Option<ValueType> {
        match self {
            Self::Int64Array => Some(Self::Int64),
            Self::StringArray => Some(Self::String),
            Self::Float64Array => Some(Self::Float64),
            Self::BoolArray => Some(Self::Bool),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_array(self) -> bool {
        self.element().is_some()
    }

    #[inline]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Time)
    }

    #[inline]
    pub const fn is_decimal(self) -> bool {
        matches!(self, Self::Decimal)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_type())
    }
}

/// Capability tag used by generated code to pick column operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKind {
    Int64,
    Float64,
    String,
    Bool,
    Bytes,
    Decimal,
    Time,
    Int64Array,
    StringArray,
    Float64Array,
    BoolArray,
    Generic,
}

impl FieldKind {
    pub const ALL: &'static [FieldKind] = &[
        Self::Int64,
        Self::Float64,
        Self::String,
        Self::Bool,
        Self::Bytes,
        Self::Decimal,
        Self::Time,
        Self::Int64Array,
        Self::StringArray,
        Self::Float64Array,
        Self::BoolArray,
        Self::Generic,
    ];

    /// Kind of a known value type.
    pub const fn of(value: ValueType) -> Self {
        match value {
            ValueType::Int64 => Self::Int64,
            ValueType::Float64 => Self::Float64,
            ValueType::String => Self::String,
            ValueType::Bool => Self::Bool,
            ValueType::Bytes => Self::Bytes,
            ValueType::Decimal => Self::Decimal,
            ValueType::Time => Self::Time,
            ValueType::Int64Array => Self::Int64Array,
            ValueType::StringArray => Self::StringArray,
            ValueType::Float64Array => Self::Float64Array,
            ValueType::BoolArray => Self::BoolArray,
        }
    }

    /// Marker type name inside the generated `kind` module.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "Int64",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Bool => "Bool",
            Self::Bytes => "Bytes",
            Self::Decimal => "Decimal",
            Self::Time => "Time",
            Self::Int64Array => "Int64Array",
            Self::StringArray => "StringArray",
            Self::Float64Array => "Float64Array",
            Self::BoolArray => "BoolArray",
            Self::Generic => "Generic",
        }
    }

    #[inline]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::Int64Array | Self::StringArray | Self::Float64Array | Self::BoolArray
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of mapping one catalog type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedType {
    pub value: ValueType,
    pub kind: FieldKind,
}

/// Map a catalog `udt_name` to its value type and field kind.
///
/// Unrecognized types fall back to `String` with the `Generic` kind.
pub fn map_catalog_type(udt_name: &str) -> MappedType {
    match known_value_type(udt_name) {
        Some(value) => MappedType {
            value,
            kind: FieldKind::of(value),
        },
        None => MappedType {
            value: ValueType::String,
            kind: FieldKind::Generic,
        },
    }
}

fn known_value_type(udt_name: &str) -> Option<ValueType> {
    let udt = udt_name.trim().to_ascii_lowercase();

    if let Some(elem) = udt.strip_prefix('_') {
        return match scalar_value_type(elem)? {
            ValueType::Int64 => Some(ValueType::Int64Array),
            ValueType::String if !matches!(elem, "json" | "jsonb") => Some(ValueType::StringArray),
            ValueType::Float64 => Some(ValueType::Float64Array),
            ValueType::Bool => Some(ValueType::BoolArray),
            _ => None,
        };
    }

    scalar_value_type(&udt)
}

fn scalar_value_type(udt: &str) -> Option<ValueType> {
    let value = match udt {
        "int2" | "int4" | "int8" | "integer" | "bigint" | "smallint" => ValueType::Int64,
        "bool" => ValueType::Bool,
        "varchar" | "text" | "bpchar" | "uuid" => ValueType::String,
        "json" | "jsonb" => ValueType::String,
        "bytea" => ValueType::Bytes,
        "float4" | "float8" => ValueType::Float64,
        "numeric" | "decimal" => ValueType::Decimal,
        "timestamp" | "timestamptz" | "date" => ValueType::Time,
        _ => return None,
    };
    Some(value)
}
