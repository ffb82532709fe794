//! Writing rendered files under the output directory

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{GenError, Result};
use crate::render::Rendered;

/// How an output file treats an existing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Rewritten on every run.
    Overwrite,
    /// Written only when absent; an existing file is left untouched.
    CreateIfAbsent,
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Already present under [`WritePolicy::CreateIfAbsent`]
    Skipped,
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Written => "written",
            Self::Skipped => "skipped",
        })
    }
}

/// One file of a run, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub outcome: WriteOutcome,
    /// `false` when the file holds unformatted source
    pub formatted: bool,
}

impl EmittedFile {
    /// Module name of the file (`users_model_gen` for `users_model_gen.rs`).
    pub fn module_name(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// Create `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))
}

/// Whether a create-if-absent file already exists at `path`.
pub fn is_present(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| GenError::io(path, e))
}

/// Write `rendered` into `dir` under `policy`.
///
/// The existence check and the write are separate steps; concurrent runs
/// against the same directory are not coordinated.
pub fn emit(dir: &Path, rendered: &Rendered, policy: WritePolicy) -> Result<EmittedFile> {
    let path = dir.join(&rendered.file_name);

    if policy == WritePolicy::CreateIfAbsent && is_present(&path)? {
        info!(path = %path.display(), "kept existing file");
        return Ok(EmittedFile {
            path,
            outcome: WriteOutcome::Skipped,
            formatted: rendered.formatted,
        });
    }

    std::fs::write(&path, &rendered.source).map_err(|e| GenError::io(&path, e))?;
    info!(path = %path.display(), formatted = rendered.formatted, "wrote file");

    Ok(EmittedFile {
        path,
        outcome: WriteOutcome::Written,
        formatted: rendered.formatted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rendered(name: &str, source: &str) -> Rendered {
        Rendered {
            file_name: name.to_string(),
            source: source.to_string(),
            formatted: true,
        }
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_model_gen.rs"), "old").unwrap();

        let file = emit(dir.path(), &rendered("a_model_gen.rs", "new"), WritePolicy::Overwrite)
            .unwrap();
        assert_eq!(file.outcome, WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "new");
        assert_eq!(file.module_name(), Some("a_model_gen"));
    }

    #[test]
    fn test_create_if_absent_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a_model.rs");
        std::fs::write(&path, "// hand written").unwrap();

        let file = emit(dir.path(), &rendered("a_model.rs", "seed"), WritePolicy::CreateIfAbsent)
            .unwrap();
        assert_eq!(file.outcome, WriteOutcome::Skipped);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "// hand written");
    }

    #[test]
    fn test_create_if_absent_writes_new() {
        let dir = TempDir::new().unwrap();
        let file = emit(dir.path(), &rendered("var.rs", "seed"), WritePolicy::CreateIfAbsent)
            .unwrap();
        assert_eq!(file.outcome, WriteOutcome::Written);
        assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "seed");
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = emit(&missing, &rendered("x.rs", ""), WritePolicy::Overwrite).unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
        assert!(err.to_string().contains("x.rs"));
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src").join("model");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
