use sqlparser::parser::ParserError;
use thiserror::Error;

/// Failure reported by a [`StatementParser`](crate::parser::sql_parser::StatementParser)
/// for a single statement.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The statement is malformed. The builder skips it and records a warning.
    #[error(transparent)]
    Syntax(#[from] ParserError),
    /// The parser itself is unusable. The whole build is aborted.
    #[error("SQL parser failed: {0}")]
    Fatal(String),
}

/// Fatal failure while turning a SQL script into a schema.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The parser collaborator failed for reasons unrelated to one statement.
    #[error("statement #{index}: {message}")]
    Parser {
        /// Zero-based position of the statement that triggered the failure.
        index: usize,
        /// Message reported by the parser.
        message: String,
    },
}

/// Violation of a schema model invariant. The builder drops the offending
/// element and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A table with the same (case-insensitive) name already exists.
    #[error("table '{table}' is declared more than once")]
    DuplicateTable {
        /// Name of the repeated table.
        table: String,
    },
    /// A column with the same (case-insensitive) name already exists in the table.
    #[error("column '{column}' is declared more than once in table '{table}'")]
    DuplicateColumn {
        /// Table holding the column.
        table: String,
        /// Name of the repeated column.
        column: String,
    },
    /// The table already has a primary key.
    #[error("table '{table}' already has a primary key")]
    DuplicatePrimaryKey {
        /// Table that already carries a primary key.
        table: String,
    },
    /// Foreign key columns and referenced columns cannot be paired positionally.
    #[error(
        "foreign key on '{table}' pairs {columns} column(s) with {referenced} referenced column(s)"
    )]
    ForeignKeyArity {
        /// Table declaring the foreign key.
        table: String,
        /// Number of referencing columns.
        columns: usize,
        /// Number of referenced columns.
        referenced: usize,
    },
}

/// The only failure surfaced by [`analyze_schema`](crate::analyzer::normalizer::analyze_schema).
#[derive(Debug, Error)]
#[error("Failed to analyze schema: {message}")]
pub struct SchemaAnalysisError {
    message: String,
    #[source]
    source: BuildError,
}

impl SchemaAnalysisError {
    /// Human-readable description of the underlying failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The build failure that aborted the analysis.
    pub fn cause(&self) -> &BuildError {
        &self.source
    }
}

impl From<BuildError> for SchemaAnalysisError {
    fn from(source: BuildError) -> Self {
        Self {
            message: source.to_string(),
            source,
        }
    }
}
