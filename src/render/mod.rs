//! Source rendering for the emitted model files
//!
//! Each template expands into a `String` with `write!`, then the text goes
//! through `syn` + `prettyplease`. Formatting is best effort: when the
//! expansion does not parse, the raw text is kept so it can be inspected.

mod generated;
mod support;
mod wrapper;

pub use generated::render_generated;
pub use support::{render_base_field, render_var};
pub use wrapper::render_wrapper;

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use crate::error::{GenError, Result};
use crate::model::TableModel;

/// Generator name stamped into generated headers.
pub const GENERATOR: &str = "pgmodelgen";

/// Generator version stamped into generated headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const VAR_FILE: &str = "var.rs";
pub const BASE_FIELD_FILE: &str = "base_field_gen.rs";

/// `<base>_model_gen.rs`
pub fn generated_file_name(model: &TableModel) -> String {
    format!("{}_model_gen.rs", model.file_base)
}

/// `<base>_model.rs`
pub fn wrapper_file_name(model: &TableModel) -> String {
    format!("{}_model.rs", model.file_base)
}

/// Data shared by every template of one run.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Module the output directory represents
    pub package: String,
    pub generated_at: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            generated_at: Utc::now(),
        }
    }

    /// Pin the generation timestamp.
    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// RFC 3339, UTC, second precision.
    pub fn timestamp(&self) -> String {
        self.generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Output of one template.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub file_name: String,
    pub source: String,
    /// `false` when formatting failed and `source` is the raw expansion
    pub formatted: bool,
}

/// Expand a template into text, then format it.
pub(crate) fn render<F>(file_name: String, expand: F) -> Result<Rendered>
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut raw = String::new();
    if let Err(source) = expand(&mut raw) {
        return Err(GenError::Render {
            file: file_name,
            source,
        });
    }
    Ok(finish(file_name, raw))
}

/// Format `raw`, falling back to the unformatted text.
pub fn finish(file_name: String, raw: String) -> Rendered {
    match format_source(&raw) {
        Ok(source) => Rendered {
            file_name,
            source,
            formatted: true,
        },
        Err(e) => {
            warn!(file = %file_name, error = %e, "formatting failed, keeping unformatted source");
            Rendered {
                file_name,
                source: raw,
                formatted: false,
            }
        }
    }
}

/// Parse and pretty-print a Rust source file.
pub fn format_source(raw: &str) -> std::result::Result<String, syn::Error> {
    let file = syn::parse_file(raw)?;
    Ok(prettyplease::unparse(&file))
}

/// Rust string literal for `s`.
pub(crate) fn lit(s: &str) -> String {
    format!("{s:?}")
}

/// Write `text` as `///` doc lines, one per source line.
///
/// `\r\n`, `\n` and a lone `\r` all end a line; other control characters
/// are not allowed in doc comments and become spaces.
pub(crate) fn doc_lines(out: &mut String, text: &str) -> fmt::Result {
    use std::fmt::Write as _;

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    for line in text.lines() {
        let line: String = line
            .chars()
            .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
            .collect();
        let line = line.trim_end();
        if line.is_empty() {
            writeln!(out, "///")?;
        } else {
            writeln!(out, "/// {line}")?;
        }
    }
    Ok(())
}
