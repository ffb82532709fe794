//! End-to-end generation runs over an in-memory catalog

use chrono::{DateTime, Utc};
use pgmodelgen::catalog::{RawColumn, StaticCatalog, StaticTable};
use pgmodelgen::emit::WriteOutcome;
use pgmodelgen::{GenError, GenerateOptions, Generator, Stage};
use tempfile::TempDir;

fn at(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
}

fn shop() -> StaticCatalog {
    StaticCatalog::new()
        .with_table(
            "public",
            "users",
            StaticTable::new(vec![
                RawColumn::new("id", "int8").identity(),
                RawColumn::new("email", "text").with_comment("Login address"),
                RawColumn::new("created_at", "timestamptz")
                    .nullable()
                    .with_default("now()"),
            ])
            .primary_key(&["id"])
            .unique("users_email_key", &["email"])
            .index(&["email"]),
        )
        .with_table(
            "public",
            "order_items",
            StaticTable::new(vec![
                RawColumn::new("order_id", "int8"),
                RawColumn::new("line", "int4"),
                RawColumn::new("price", "numeric"),
                RawColumn::new("tags", "_text").nullable(),
            ])
            .unique("order_items_order_line_key", &["order_id", "line"])
            .index(&["order_id"]),
        )
        .with_table(
            "public",
            "events_2024",
            StaticTable::new(vec![
                RawColumn::new("id", "int8"),
                RawColumn::new("payload", "jsonb"),
            ])
            .partition_of(&["id"]),
        )
        .with_table(
            "public",
            "audit_log",
            StaticTable::new(vec![RawColumn::new("line", "text")]),
        )
}

fn read(dir: &TempDir, name: &str) -> String {
    std::fs::read_to_string(dir.path().join(name)).unwrap()
}

fn tables(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn generates_every_file() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop();
    let options = GenerateOptions::new(out.path(), tables(&["users", "order_items", "events_2024"]));

    let report = Generator::new(options).run(&mut catalog).unwrap();

    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.tables.len(), 3);
    for file in [
        "var.rs",
        "base_field_gen.rs",
        "users_model_gen.rs",
        "users_model.rs",
        "order_items_model_gen.rs",
        "order_items_model.rs",
        "events_2024_model_gen.rs",
        "events_2024_model.rs",
    ] {
        assert!(out.path().join(file).exists(), "{file}");
    }
    assert!(report.files().all(|f| f.formatted));
    assert_eq!(
        report.module_names(),
        [
            "base_field_gen",
            "events_2024_model",
            "events_2024_model_gen",
            "order_items_model",
            "order_items_model_gen",
            "users_model",
            "users_model_gen",
            "var",
        ]
    );
}

#[test]
fn generated_users_module() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop();
    let options = GenerateOptions::new(out.path(), tables(&["users"]))
        .package("store")
        .generated_at(at("2024-05-01T10:20:30Z"));

    Generator::new(options).run(&mut catalog).unwrap();

    let source = read(&out, "users_model_gen.rs");
    assert!(source.contains("2024-05-01T10:20:30Z"));
    assert!(source.contains("`store` package"));
    assert!(source.contains("/// Login address"));
    assert!(source.contains("pub struct DefaultUsersModel;"));
    assert!(source.contains("pub struct UsersIndexed {"));
    assert!(source.contains(
        "INSERT INTO \\\"public\\\".\\\"users\\\" (\\\"email\\\", \\\"created_at\\\")"
    ));
    assert!(source.contains("SET \\\"email\\\" = $1 WHERE \\\"id\\\" = $2"));
}

#[test]
fn fallback_keys_drive_lookups() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop();
    let options = GenerateOptions::new(out.path(), tables(&["order_items", "events_2024"]));

    Generator::new(options).run(&mut catalog).unwrap();

    let items = read(&out, "order_items_model_gen.rs");
    assert!(items.contains("WHERE \\\"order_id\\\" = $1 AND \\\"line\\\" = $2::int8::int4"));
    assert!(items.contains("use rust_decimal::Decimal;"));
    assert!(items.contains("use super::base_field_gen::ArrayField;"));
    assert!(items.contains("pub tags: Option<Vec<String>>,"));

    let events = read(&out, "events_2024_model_gen.rs");
    assert!(events.contains("pub const KEY: &'static [&'static str] = &[\"id\"];"));
    assert!(!events.contains("chrono"));
}

#[test]
fn table_failures_do_not_stop_the_run() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop().fail_on("columns", "users");
    let options = GenerateOptions::new(
        out.path(),
        tables(&["users", "audit_log", "ghost", "order_items"]),
    );

    let report = Generator::new(options).run(&mut catalog).unwrap();

    assert!(!report.is_success());
    let failed: Vec<_> = report
        .failures
        .iter()
        .map(|e| (e.table.as_str(), e.stage))
        .collect();
    assert_eq!(
        failed,
        [
            ("users", Stage::Introspect),
            ("audit_log", Stage::ResolveKeys),
            ("ghost", Stage::Introspect),
        ]
    );
    assert!(matches!(report.failures[1].source, GenError::MissingIdentity { .. }));
    assert!(matches!(report.failures[2].source, GenError::TableNotFound { .. }));

    assert_eq!(report.tables.len(), 1);
    assert!(out.path().join("order_items_model_gen.rs").exists());
    assert!(!out.path().join("users_model_gen.rs").exists());
    assert!(!out.path().join("audit_log_model.rs").exists());
}

#[test]
fn regeneration_keeps_wrappers() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop();

    let first = GenerateOptions::new(out.path(), tables(&["users"]))
        .generated_at(at("2024-01-01T00:00:00Z"));
    Generator::new(first).run(&mut catalog).unwrap();

    let generated_before = read(&out, "users_model_gen.rs");
    let custom = "// hand-written\npub fn active_users() {}\n";
    std::fs::write(out.path().join("users_model.rs"), custom).unwrap();
    std::fs::write(out.path().join("var.rs"), "// edited errors\n").unwrap();

    let second = GenerateOptions::new(out.path(), tables(&["users"]))
        .generated_at(at("2024-06-01T00:00:00Z"));
    let report = Generator::new(second).run(&mut catalog).unwrap();

    let generated_after = read(&out, "users_model_gen.rs");
    assert_ne!(generated_before, generated_after);
    assert!(generated_after.contains("2024-06-01T00:00:00Z"));
    assert_eq!(read(&out, "users_model.rs"), custom);
    assert_eq!(read(&out, "var.rs"), "// edited errors\n");

    let outcomes: Vec<_> = report
        .files()
        .map(|f| (f.module_name().unwrap().to_string(), f.outcome))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("var".to_string(), WriteOutcome::Skipped),
            ("base_field_gen".to_string(), WriteOutcome::Written),
            ("users_model_gen".to_string(), WriteOutcome::Written),
            ("users_model".to_string(), WriteOutcome::Skipped),
        ]
    );
}

#[test]
fn without_custom_wrappers() {
    let out = TempDir::new().unwrap();
    let mut catalog = shop();
    let options = GenerateOptions::new(out.path(), tables(&["users"])).with_custom(false);

    let report = Generator::new(options).run(&mut catalog).unwrap();

    assert!(out.path().join("users_model_gen.rs").exists());
    assert!(!out.path().join("users_model.rs").exists());
    assert_eq!(report.tables[0].files.len(), 1);
}

#[test]
fn package_defaults_to_directory_name() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("src").join("entities");
    let mut catalog = shop();

    let generator = Generator::new(GenerateOptions::new(&dir, tables(&["users"])));
    assert_eq!(generator.package(), "entities");
    generator.run(&mut catalog).unwrap();

    let var = std::fs::read_to_string(dir.join("var.rs")).unwrap();
    assert!(var.contains("`entities` models"));
}
