//! Error types for the CLI

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Required input missing; reported before any file or database access
    #[error("{0}")]
    Usage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(ConfigError),

    /// The catalog connection could not be opened
    #[error("failed to connect to the database: {0}")]
    Connection(#[source] postgres::Error),

    /// Run-level generation failure (output directory, support files)
    #[error(transparent)]
    Generation(#[from] pgmodelgen::GenError),

    /// Some tables failed; details were already reported
    #[error("{failed} of {total} tables failed")]
    TablesFailed { failed: usize, total: usize },
}

impl CliError {
    /// Process exit status: 2 for usage errors, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            _ => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Missing(_) => Self::Usage(e.to_string()),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_is_usage() {
        let err = CliError::from(ConfigError::Missing("at least one table (--table)"));
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "missing at least one table (--table)");
    }

    #[test]
    fn parse_failure_is_config() {
        let err = CliError::from(ConfigError::NotFound("x.toml".into()));
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
