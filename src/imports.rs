//! `use` declarations required by a generated model module

use std::collections::BTreeSet;

use crate::typemap::ValueType;

/// Imports every generated model module starts from: the `postgres`
/// transport, the query builder and error types of the support modules, and
/// `std::fmt` for the row key display.
pub const BASELINE: &[&str] = &[
    "postgres::types::ToSql",
    "postgres::{GenericClient, Row}",
    "std::fmt",
    "super::base_field_gen::{kind, Condition, Field, SelectBuilder}",
    "super::var::{ModelError, ModelResult}",
];

pub const TEMPORAL: &str = "chrono::{DateTime, Utc}";
pub const DECIMAL: &str = "rust_decimal::Decimal";
pub const ARRAY: &str = "super::base_field_gen::ArrayField";

/// Baseline plus whatever the column value types pull in; sorted, no duplicates.
pub fn infer_imports<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = ValueType>,
{
    let mut imports: BTreeSet<String> = BASELINE.iter().map(|s| s.to_string()).collect();

    for value in values {
        if value.is_temporal() {
            imports.insert(TEMPORAL.to_string());
        }
        if value.is_decimal() {
            imports.insert(DECIMAL.to_string());
        }
        if value.is_array() {
            imports.insert(ARRAY.to_string());
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_only() {
        let imports = infer_imports([ValueType::Int64, ValueType::String, ValueType::Bool]);
        assert_eq!(imports.len(), BASELINE.len());
        assert!(!imports.contains(TEMPORAL));
        assert!(!imports.contains(DECIMAL));
        assert!(!imports.contains(ARRAY));
    }

    #[test]
    fn test_temporal_decimal_array() {
        let imports = infer_imports([
            ValueType::Time,
            ValueType::Decimal,
            ValueType::StringArray,
            ValueType::Int64Array,
            ValueType::Time,
        ]);
        assert!(imports.contains(TEMPORAL));
        assert!(imports.contains(DECIMAL));
        assert!(imports.contains(ARRAY));
        assert_eq!(imports.len(), BASELINE.len() + 3);
    }

    #[test]
    fn test_sorted_output() {
        let imports: Vec<_> = infer_imports([ValueType::Decimal, ValueType::Time])
            .into_iter()
            .collect();
        let mut sorted = imports.clone();
        sorted.sort();
        assert_eq!(imports, sorted);
        assert_eq!(imports[0], TEMPORAL);
    }
}
