//! Evaluate SQL table definitions against the first three normal forms and
//! suggest corrective DDL.
#![warn(missing_docs)]

/// Normal-form analyzers (1NF, 2NF, 3NF), naming heuristics, and the orchestrator that sequences them.
pub mod analyzer;
/// Error types shared by the parser, builder, and orchestrator.
pub mod error;
/// Corrective SQL: per-issue fix fragments and the combined improvement script.
pub mod generator;
/// Tracing subscriber setup for the command-line front end.
pub mod logging;
/// Relational schema model and analysis result types.
pub mod model;
/// Analysis artifacts written to disk and the Markdown report.
pub mod output;
/// SQL statement splitting, parsing, and schema building.
pub mod parser;

pub use analyzer::normalizer::{analyze_schema, Normalizer};
pub use error::SchemaAnalysisError;
pub use generator::improvement_sql::generate_improvement_sql;
