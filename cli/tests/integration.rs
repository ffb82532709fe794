//! End-to-end integration tests for the pgmodelgen CLI

use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

/// Nothing listens on port 1, so connecting fails fast.
const UNREACHABLE_URL: &str = "postgres://nobody@127.0.0.1:1/nodb?connect_timeout=2";

/// Get the pgmodelgen CLI binary, isolated from the caller's environment
fn pgmodelgen_cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("pgmodelgen"));
    cmd.current_dir(dir.path())
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

mod help {
    use super::*;

    #[test]
    fn help_lists_flags() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--url"))
            .stdout(predicate::str::contains("--table"))
            .stdout(predicate::str::contains("--with-custom"))
            .stdout(predicate::str::contains("DATABASE_URL"));
    }

    #[test]
    fn version_flag() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pgmodelgen"));
    }
}

mod usage {
    use super::*;

    #[test]
    fn missing_url_is_usage_error() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--table", "users", "--dir", "out"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("connection string"));

        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn missing_table_is_usage_error() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--url", UNREACHABLE_URL, "--dir", "out"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--table"));

        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn blank_table_list_is_usage_error() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--url", UNREACHABLE_URL, "--table", " , "])
            .assert()
            .code(2);
    }

    #[test]
    fn with_custom_needs_bool() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--url", UNREACHABLE_URL, "--table", "users", "--with-custom", "maybe"])
            .assert()
            .code(2);
    }
}

mod config {
    use super::*;

    #[test]
    fn explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--config", "missing.toml"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("config not found"));
    }

    #[test]
    fn malformed_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("pgmodelgen.toml"), "tables = [").unwrap();

        pgmodelgen_cli(&temp)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to parse"));
    }

    #[test]
    fn config_supplies_required_settings() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("pgmodelgen.toml"),
            format!("url = \"{UNREACHABLE_URL}\"\ntables = [\"users\"]\ndir = \"models\"\n"),
        )
        .unwrap();

        // Settings are complete, so the run gets as far as connecting.
        pgmodelgen_cli(&temp)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to connect"));

        assert!(temp.path().join("models").join("var.rs").exists());
    }
}

mod connection {
    use super::*;

    #[test]
    fn connection_failure_after_support_files() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .args(["--url", UNREACHABLE_URL, "--table", "users", "--dir", "src/store"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("package `store`"))
            .stderr(predicate::str::contains("Error: failed to connect"));

        let dir = temp.path().join("src").join("store");
        assert!(dir.join("var.rs").exists());
        assert!(dir.join("base_field_gen.rs").exists());
        assert!(!dir.join("users_model_gen.rs").exists());
    }

    #[test]
    fn url_from_environment() {
        let temp = TempDir::new().unwrap();

        pgmodelgen_cli(&temp)
            .env("DATABASE_URL", UNREACHABLE_URL)
            .args(["--table", "users"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to connect"));
    }
}
