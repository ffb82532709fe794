//! Configuration loading and merging
//!
//! Settings come from three layers, highest first: command-line flags (and
//! their environment fallbacks), the optional `pgmodelgen.toml`, then the
//! built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use pgmodelgen::GenerateOptions;
use pgmodelgen::generator::{DEFAULT_DIR, DEFAULT_PACKAGE, DEFAULT_SCHEMA, parse_table_list};

/// Config file looked up in the current directory when `--config` is not given
pub const CONFIG_FILE: &str = "pgmodelgen.toml";

/// Contents of `pgmodelgen.toml`; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub url: Option<String>,
    pub schema: Option<String>,
    pub tables: Option<Tables>,
    pub dir: Option<PathBuf>,
    pub package: Option<String>,
    pub with_custom: Option<bool>,
}

/// Table list, either `"a,b"` or `["a", "b"]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Tables {
    One(String),
    Many(Vec<String>),
}

impl Tables {
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::One(s) => parse_table_list(s),
            Self::Many(v) => v.iter().flat_map(|s| parse_table_list(s)).collect(),
        }
    }
}

impl Config {
    /// Load `pgmodelgen.toml` from the current directory; absent means empty.
    pub fn load() -> Result<Self, Error> {
        match Self::load_from(Path::new(CONFIG_FILE)) {
            Err(Error::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load a config file that must exist.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;

        toml::from_str(&content).map_err(|e| Error::Parse(path.into(), e))
    }
}

/// Values given on the command line; `None` when not given.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub schema: Option<String>,
    pub tables: Option<String>,
    pub dir: Option<PathBuf>,
    pub package: Option<String>,
    pub with_custom: Option<bool>,
}

/// Fully merged settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub options: GenerateOptions,
}

impl Settings {
    /// Merge `overrides` over `file` over the defaults.
    pub fn resolve(overrides: Overrides, file: Config) -> Result<Self, Error> {
        let url = overrides
            .url
            .or(file.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(Error::Missing("a connection string (--url or DATABASE_URL)"))?;

        let tables = match overrides.tables {
            Some(list) => parse_table_list(&list),
            None => file.tables.map(|t| t.to_list()).unwrap_or_default(),
        };
        if tables.is_empty() {
            return Err(Error::Missing("at least one table (--table)"));
        }

        let dir = overrides
            .dir
            .or(file.dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

        let options = GenerateOptions::new(dir, tables)
            .schema(
                overrides
                    .schema
                    .or(file.schema)
                    .unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            )
            .package(
                overrides
                    .package
                    .or(file.package)
                    .unwrap_or_else(|| DEFAULT_PACKAGE.to_string()),
            )
            .with_custom(overrides.with_custom.or(file.with_custom).unwrap_or(true));

        Ok(Self { url, options })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    /// A required setting is absent from every layer
    #[error("missing {0}")]
    Missing(&'static str),
}

pub type ConfigError = Error;
