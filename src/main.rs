//! CLI entry point for `schema-normalizer`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use schema_normalizer::logging;
use schema_normalizer::model::NormalForm;
use schema_normalizer::output::formatter;
use schema_normalizer::parser::SchemaDialect;
use schema_normalizer::Normalizer;

#[derive(Parser)]
#[command(
    name = "schema-normalizer",
    about = "Check SQL table definitions against 1NF, 2NF and 3NF and suggest corrective DDL"
)]
struct Cli {
    /// Input SQL files
    #[arg(required_unless_present = "schema_dir")]
    input: Vec<PathBuf>,

    /// Process all .sql files in directory
    #[arg(long)]
    schema_dir: Option<PathBuf>,

    /// SQL dialect used to parse the input
    #[arg(long, default_value = "generic")]
    dialect: SchemaDialect,

    /// Output directory
    #[arg(long, default_value = "normalizer-output")]
    output_dir: PathBuf,

    /// Exit with status 1 when the schema does not reach this normal form
    #[arg(long)]
    min_form: Option<NormalForm>,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    // Collect input files
    let mut sql_files = cli.input.clone();
    if let Some(dir) = &cli.schema_dir {
        match std::fs::read_dir(dir) {
            Ok(entries) => {
                let mut found: Vec<PathBuf> = entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().is_some_and(|e| e == "sql"))
                    .collect();
                found.sort();
                sql_files.extend(found);
            }
            Err(e) => {
                eprintln!("Error reading schema directory: {e}");
                process::exit(2);
            }
        }
    }

    if sql_files.is_empty() {
        eprintln!("No input SQL files provided");
        process::exit(2);
    }

    // Read and concatenate all SQL
    let mut combined_sql = String::new();
    for path in &sql_files {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                combined_sql.push_str(&content);
                combined_sql.push_str("\n;\n");
            }
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(2);
            }
        }
    }

    let normalizer = Normalizer::with_dialect(cli.dialect);
    let result = match normalizer.analyze_schema(&combined_sql) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    if cli.verbose {
        eprintln!(
            "Parsed {} tables from {} file(s), {} statement(s) skipped",
            result.schema().tables().len(),
            sql_files.len(),
            result.warnings().len()
        );
        for issue in result.all_issues() {
            eprintln!(
                "[{}] {}.{}: {}",
                issue.violated_form,
                issue.table_name,
                issue.column_name.as_deref().unwrap_or("*"),
                issue.description
            );
        }
    }

    // Derive name from first input file
    let name = sql_files
        .first()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    if let Err(e) = formatter::write_output(&cli.output_dir, name, &result) {
        eprintln!("Error writing output: {e}");
        process::exit(2);
    }

    println!("Achieved normal form: {}", result.achieved_form_label());
    for form in NormalForm::ALL {
        println!("{form} issues: {}", result.issues(form).len());
    }

    if let Some(min_form) = cli.min_form {
        if result.achieved_form() < Some(min_form) {
            process::exit(1);
        }
    }
}
