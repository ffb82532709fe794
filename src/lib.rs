//! # pgmodelgen
//!
//! Generates typed Rust data-access modules from PostgreSQL catalog metadata.
//!
//! For every requested table the generator reads columns, comments, key
//! constraints and index membership, derives a [`TableModel`] and writes:
//!
//! | File                   | Policy           | Contents                                  |
//! |------------------------|------------------|-------------------------------------------|
//! | `var.rs`               | create if absent | `ModelError`, `ModelResult`               |
//! | `base_field_gen.rs`    | always rewritten | field kinds, column handles, `SelectBuilder` |
//! | `<table>_model_gen.rs` | always rewritten | row struct and `Default<Table>Model` CRUD |
//! | `<table>_model.rs`     | create if absent | editable `<Table>Model` wrapper           |
//!
//! ## Quick Start
//!
//! ```rust
//! use pgmodelgen::catalog::{RawColumn, StaticCatalog, StaticTable};
//! use pgmodelgen::{GenerateOptions, Generator};
//!
//! let mut catalog = StaticCatalog::new().with_table(
//!     "public",
//!     "users",
//!     StaticTable::new(vec![
//!         RawColumn::new("id", "int8").identity(),
//!         RawColumn::new("email", "text"),
//!     ])
//!     .primary_key(&["id"]),
//! );
//!
//! let out = tempfile::tempdir().unwrap();
//! let generator = Generator::new(GenerateOptions::new(out.path(), vec!["users".into()]));
//! let report = generator.run(&mut catalog).unwrap();
//!
//! assert!(report.is_success());
//! assert!(out.path().join("users_model_gen.rs").exists());
//! ```
//!
//! Against a live database, use [`catalog::PostgresCatalog`] instead.

pub mod catalog;
pub mod emit;
pub mod error;
pub mod generator;
pub mod imports;
pub mod introspect;
pub mod keys;
pub mod model;
pub mod naming;
pub mod render;
pub mod typemap;

pub use catalog::{Catalog, CatalogError, PostgresCatalog};
pub use error::{GenError, Result, Stage, TableError};
pub use generator::{GenerateOptions, Generator, RunReport, TableReport};
pub use keys::{KeyColumnSet, KeySource, resolve_keys};
pub use model::{FieldModel, Param, TableModel};
pub use typemap::{FieldKind, MappedType, ValueType, map_catalog_type};
