/// SQL expression helpers used when reading check constraints.
pub mod expr;
/// Identifier and table-name normalization helpers (schema-qualified names, quoted identifiers).
pub mod names;
/// Maps parsed DDL statements onto the schema model.
pub mod schema_builder;
/// Dialect selection, statement splitting, and the parser seam.
pub mod sql_parser;

pub use schema_builder::{build_schema, BuiltSchema, ParseWarning};
pub use sql_parser::{SchemaDialect, SqlParser, StatementParser};

/// Convenience: build a schema from DDL with the generic dialect.
pub fn parse_schema(sql: &str) -> Result<BuiltSchema, crate::error::BuildError> {
    build_schema(&SqlParser::default(), sql)
}
