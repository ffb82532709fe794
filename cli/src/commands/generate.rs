//! Generate command: write support files, connect, then generate every table

use pgmodelgen::emit::{EmittedFile, WriteOutcome};
use pgmodelgen::{Generator, PostgresCatalog, RunReport};
use tracing::debug;

use crate::config::Settings;
use crate::error::CliError;
use crate::output;

/// Run the generator for `settings`.
///
/// Support files are written before the connection is opened; a connection
/// failure aborts the run, a table failure only that table.
pub fn run(settings: &Settings) -> Result<(), CliError> {
    let generator = Generator::new(settings.options.clone());
    let options = generator.options();
    debug!(
        schema = %options.schema,
        tables = ?options.tables,
        dir = %options.dir.display(),
        with_custom = options.with_custom,
        "resolved settings"
    );

    println!(
        "{} {} {}",
        output::heading("pgmodelgen"),
        output::label(&format!("{}.{{{}}}", options.schema, options.tables.join(","))),
        output::muted(&format!(
            "→ {} (package `{}`)",
            options.dir.display(),
            generator.package()
        ))
    );

    let support = generator.write_support()?;

    let mut catalog = PostgresCatalog::connect(&settings.url).map_err(CliError::Connection)?;
    let report = generator.run_tables(&mut catalog, support);

    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::TablesFailed {
            failed: report.failures.len(),
            total: options.tables.len(),
        })
    }
}

fn print_report(report: &RunReport) {
    for file in report.files() {
        println!("  {}", file_line(file));
    }

    for failure in &report.failures {
        eprintln!("{}", output::err_line(&failure.to_string()));
    }

    let modules = report.module_names();
    if !modules.is_empty() {
        println!();
        println!("{}", output::muted("Declare the modules in the package's mod.rs:"));
        for module in modules {
            println!("  pub mod {module};");
        }
    }

    println!();
    let summary = format!(
        "{} table(s) generated, {} file(s) written",
        report.tables.len(),
        report.written()
    );
    if report.is_success() {
        println!("{}", output::success(&summary));
    } else {
        println!(
            "{}",
            output::warning(&format!("{summary}, {} table(s) failed", report.failures.len()))
        );
    }
}

fn file_line(file: &EmittedFile) -> String {
    let name = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let status = match file.outcome {
        WriteOutcome::Written if file.formatted => output::success("written"),
        WriteOutcome::Written => output::warning("written (unformatted)"),
        WriteOutcome::Skipped => output::muted("kept   "),
    };
    format!("{status}  {name}")
}
