//! Run orchestration: support files, then each requested table in order

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn};

use crate::catalog::Catalog;
use crate::emit::{EmittedFile, WriteOutcome, WritePolicy, emit, ensure_dir};
use crate::error::{Result, Stage, TableError};
use crate::introspect::introspect_table;
use crate::render::{
    RenderContext, render_base_field, render_generated, render_var, render_wrapper,
};

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_DIR: &str = "./src/model";
/// Placeholder package name, replaced by the output directory name.
pub const DEFAULT_PACKAGE: &str = "model";

/// Split a comma-separated table list, dropping blank entries.
pub fn parse_table_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Package name for `dir`: an explicit name wins, the default becomes the
/// directory's base name.
pub fn resolve_package(package: &str, dir: &Path) -> String {
    if package != DEFAULT_PACKAGE {
        return package.to_string();
    }
    dir.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map_or_else(|| package.to_string(), str::to_string)
}

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub schema: String,
    /// Tables in processing order
    pub tables: Vec<String>,
    pub dir: PathBuf,
    /// Package name before default resolution
    pub package: String,
    /// Seed the editable `<base>_model.rs` wrappers
    pub with_custom: bool,
    /// Header timestamp; the current time when unset
    pub generated_at: Option<DateTime<Utc>>,
}

impl GenerateOptions {
    pub fn new(dir: impl Into<PathBuf>, tables: Vec<String>) -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            tables,
            dir: dir.into(),
            package: DEFAULT_PACKAGE.to_string(),
            with_custom: true,
            generated_at: None,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_custom(mut self, with_custom: bool) -> Self {
        self.with_custom = with_custom;
        self
    }

    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn resolved_package(&self) -> String {
        resolve_package(&self.package, &self.dir)
    }
}

/// Files produced for one table.
#[derive(Debug, Clone)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    pub type_name: String,
    pub files: Vec<EmittedFile>,
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub support: Vec<EmittedFile>,
    pub tables: Vec<TableReport>,
    pub failures: Vec<TableError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every file touched or kept, support files first.
    pub fn files(&self) -> impl Iterator<Item = &EmittedFile> {
        self.support
            .iter()
            .chain(self.tables.iter().flat_map(|t| t.files.iter()))
    }

    pub fn written(&self) -> usize {
        self.files()
            .filter(|f| f.outcome == WriteOutcome::Written)
            .count()
    }

    /// Module names to declare in the package's `mod.rs`, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files()
            .filter_map(EmittedFile::module_name)
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Drives one run over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct Generator {
    options: GenerateOptions,
    ctx: RenderContext,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        let mut ctx = RenderContext::new(options.resolved_package());
        if let Some(at) = options.generated_at {
            ctx = ctx.at(at);
        }
        Self { options, ctx }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn package(&self) -> &str {
        &self.ctx.package
    }

    /// Create the output directory and write `var.rs` and `base_field_gen.rs`.
    pub fn write_support(&self) -> Result<Vec<EmittedFile>> {
        let dir = &self.options.dir;
        ensure_dir(dir)?;
        Ok(vec![
            emit(dir, &render_var(&self.ctx)?, WritePolicy::CreateIfAbsent)?,
            emit(dir, &render_base_field(&self.ctx)?, WritePolicy::Overwrite)?,
        ])
    }

    /// Introspect, render and write one table.
    pub fn generate_table<C: Catalog + ?Sized>(
        &self,
        catalog: &mut C,
        table: &str,
    ) -> std::result::Result<TableReport, TableError> {
        let schema = self.options.schema.as_str();
        let dir = self.options.dir.as_path();
        let fail = |stage: Stage| move |e| TableError::new(schema, table, stage, e);

        let model = introspect_table(catalog, schema, table)?;

        let mut files = Vec::with_capacity(2);
        let generated = render_generated(&self.ctx, &model).map_err(fail(Stage::Render))?;
        files.push(emit(dir, &generated, WritePolicy::Overwrite).map_err(fail(Stage::Write))?);

        if self.options.with_custom {
            let wrapper = render_wrapper(&self.ctx, &model).map_err(fail(Stage::Render))?;
            files.push(
                emit(dir, &wrapper, WritePolicy::CreateIfAbsent).map_err(fail(Stage::Write))?,
            );
        }

        Ok(TableReport {
            schema: model.schema,
            table: model.table,
            type_name: model.type_name,
            files,
        })
    }

    /// Process every requested table in order; failures are collected, not fatal.
    pub fn run_tables<C: Catalog + ?Sized>(
        &self,
        catalog: &mut C,
        support: Vec<EmittedFile>,
    ) -> RunReport {
        let mut report = RunReport {
            support,
            ..Default::default()
        };

        for table in &self.options.tables {
            let _span = info_span!("table", schema = %self.options.schema, %table).entered();
            match self.generate_table(catalog, table) {
                Ok(done) => {
                    info!(type_name = %done.type_name, "generated model");
                    report.tables.push(done);
                }
                Err(e) => {
                    warn!(stage = %e.stage, error = %e.source, "table failed");
                    report.failures.push(e);
                }
            }
        }

        report
    }

    /// Support files, then every table.
    pub fn run<C: Catalog + ?Sized>(&self, catalog: &mut C) -> Result<RunReport> {
        let support = self.write_support()?;
        Ok(self.run_tables(catalog, support))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table_list() {
        assert_eq!(parse_table_list("users, orders,,  ,items "), ["users", "orders", "items"]);
        assert!(parse_table_list(" , ").is_empty());
    }

    #[test]
    fn test_resolve_package() {
        assert_eq!(resolve_package("model", Path::new("./src/store")), "store");
        assert_eq!(resolve_package("db", Path::new("./src/store")), "db");
        assert_eq!(resolve_package("model", Path::new("./src/model")), "model");
        assert_eq!(resolve_package("model", Path::new(".")), "model");
    }

    #[test]
    fn test_options_defaults() {
        let options = GenerateOptions::new("out/entities", vec!["users".into()]);
        assert_eq!(options.schema, "public");
        assert!(options.with_custom);
        assert_eq!(options.resolved_package(), "entities");
        assert_eq!(Generator::new(options).package(), "entities");
    }
}
