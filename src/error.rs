//! Error types for model generation

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;

/// Generation errors
#[derive(Debug, Error)]
pub enum GenError {
    /// Catalog query failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog reported no columns
    #[error("table {schema}.{table} does not exist or has no columns")]
    TableNotFound { schema: String, table: String },

    /// None of the identity sources yielded columns
    #[error(
        "table {schema}.{table}: missing primary key or unique constraint \
         (an identity is required; tried primary key, first unique constraint by name, \
         then partition parent primary key; composite keys are supported)"
    )]
    MissingIdentity { schema: String, table: String },

    /// Template expansion failed
    #[error("failed to render {file}: {source}")]
    Render {
        file: String,
        #[source]
        source: fmt::Error,
    },

    /// Output file could not be checked or written
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Step of the per-table pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Introspect,
    ResolveKeys,
    Render,
    Write,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Introspect => "introspect",
            Self::ResolveKeys => "resolve keys",
            Self::Render => "render",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure scoped to one requested table.
#[derive(Debug, Error)]
#[error("table {table} ({stage}): {source}")]
pub struct TableError {
    pub schema: String,
    pub table: String,
    pub stage: Stage,
    #[source]
    pub source: GenError,
}

impl TableError {
    pub fn new(schema: &str, table: &str, stage: Stage, source: GenError) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            stage,
            source,
        }
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
