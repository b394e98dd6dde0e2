use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    AnsiDialect, Dialect, DuckDbDialect, GenericDialect, MsSqlDialect, MySqlDialect,
    PostgreSqlDialect, SQLiteDialect, SnowflakeDialect,
};
use sqlparser::parser::Parser;
use thiserror::Error;

use crate::error::ParseFailure;

/// SQL dialect used to tokenize and parse DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDialect {
    /// Permissive dialect accepting most common DDL.
    #[default]
    Generic,
    /// MySQL / MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    MsSql,
    /// ANSI SQL.
    Ansi,
    /// Snowflake.
    Snowflake,
    /// DuckDB.
    DuckDb,
}

impl SchemaDialect {
    /// Every supported dialect, in the order they are listed to users.
    pub const ALL: [SchemaDialect; 8] = [
        SchemaDialect::Generic,
        SchemaDialect::MySql,
        SchemaDialect::PostgreSql,
        SchemaDialect::Sqlite,
        SchemaDialect::MsSql,
        SchemaDialect::Ansi,
        SchemaDialect::Snowflake,
        SchemaDialect::DuckDb,
    ];

    /// Canonical lowercase name, as accepted by `--dialect`.
    pub fn name(self) -> &'static str {
        match self {
            SchemaDialect::Generic => "generic",
            SchemaDialect::MySql => "mysql",
            SchemaDialect::PostgreSql => "postgresql",
            SchemaDialect::Sqlite => "sqlite",
            SchemaDialect::MsSql => "mssql",
            SchemaDialect::Ansi => "ansi",
            SchemaDialect::Snowflake => "snowflake",
            SchemaDialect::DuckDb => "duckdb",
        }
    }

    /// A fresh `sqlparser` dialect instance.
    pub fn to_dialect(self) -> Box<dyn Dialect> {
        match self {
            SchemaDialect::Generic => Box::new(GenericDialect {}),
            SchemaDialect::MySql => Box::new(MySqlDialect {}),
            SchemaDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
            SchemaDialect::Sqlite => Box::new(SQLiteDialect {}),
            SchemaDialect::MsSql => Box::new(MsSqlDialect {}),
            SchemaDialect::Ansi => Box::new(AnsiDialect {}),
            SchemaDialect::Snowflake => Box::new(SnowflakeDialect {}),
            SchemaDialect::DuckDb => Box::new(DuckDbDialect {}),
        }
    }
}

impl fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown SQL dialect '{0}' (expected one of: generic, mysql, postgresql, sqlite, mssql, ansi, snowflake, duckdb)")]
pub struct UnknownDialect(pub String);

impl FromStr for SchemaDialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(SchemaDialect::Generic),
            "mysql" | "mariadb" => Ok(SchemaDialect::MySql),
            "postgresql" | "postgres" | "pg" => Ok(SchemaDialect::PostgreSql),
            "sqlite" => Ok(SchemaDialect::Sqlite),
            "mssql" | "sqlserver" | "tsql" => Ok(SchemaDialect::MsSql),
            "ansi" => Ok(SchemaDialect::Ansi),
            "snowflake" => Ok(SchemaDialect::Snowflake),
            "duckdb" => Ok(SchemaDialect::DuckDb),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

/// Turns the text of one statement into parsed `sqlparser` statements.
///
/// The schema builder only talks to the parser through this trait, so tests
/// can inject failures that the real parser never produces.
pub trait StatementParser {
    /// Parse a single statement (without its trailing `;`).
    fn parse_statement(&self, sql: &str) -> Result<Vec<Statement>, ParseFailure>;
}

impl<P: StatementParser + ?Sized> StatementParser for &P {
    fn parse_statement(&self, sql: &str) -> Result<Vec<Statement>, ParseFailure> {
        (**self).parse_statement(sql)
    }
}

/// [`StatementParser`] backed by `sqlparser`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlParser {
    dialect: SchemaDialect,
}

impl SqlParser {
    /// Parser for the given dialect.
    pub fn new(dialect: SchemaDialect) -> Self {
        Self { dialect }
    }

    /// Dialect this parser was configured with.
    pub fn dialect(&self) -> SchemaDialect {
        self.dialect
    }
}

impl StatementParser for SqlParser {
    fn parse_statement(&self, sql: &str) -> Result<Vec<Statement>, ParseFailure> {
        let dialect = self.dialect.to_dialect();
        Ok(Parser::parse_sql(dialect.as_ref(), sql)?)
    }
}

/// Split a script into statements on `;`.
///
/// Semicolons inside string literals, quoted identifiers, and comments do not
/// terminate a statement. Returned slices are trimmed; empty ones are dropped.
pub fn split_statements(script: &str) -> Vec<&str> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut statements = Vec::new();
    let mut state = State::Code;
    let mut start = 0usize;
    let mut chars = script.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        match state {
            State::Code => match ch {
                '\'' | '"' | '`' => state = State::Quoted(ch),
                '[' => state = State::Quoted(']'),
                '-' if matches!(chars.peek(), Some((_, '-'))) => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if matches!(chars.peek(), Some((_, '*'))) => {
                    chars.next();
                    state = State::BlockComment;
                }
                ';' => {
                    push_statement(&mut statements, &script[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            },
            State::Quoted(close) if ch == close => state = State::Code,
            State::LineComment if ch == '\n' => state = State::Code,
            State::BlockComment if ch == '*' && matches!(chars.peek(), Some((_, '/'))) => {
                chars.next();
                state = State::Code;
            }
            _ => {}
        }
    }
    push_statement(&mut statements, &script[start..]);
    statements
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        statements.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_statements_ignores_semicolons_in_literals_and_comments() {
        let script = "CREATE TABLE a (x VARCHAR(10) DEFAULT ';');\n\
                      -- trailing; comment\n\
                      /* block; comment */ CREATE TABLE \"b;c\" (y INT);\n\
                      ;;  ";
        let statements = split_statements(script);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "CREATE TABLE a (x VARCHAR(10) DEFAULT ';')");
        assert!(statements[1].ends_with("CREATE TABLE \"b;c\" (y INT)"));
    }

    #[test]
    fn split_statements_keeps_unterminated_tail() {
        assert_eq!(
            split_statements("CREATE TABLE a (x INT); CREATE TABLE b (y INT)"),
            vec!["CREATE TABLE a (x INT)", "CREATE TABLE b (y INT)"]
        );
        assert!(split_statements("  \n ").is_empty());
    }

    #[test]
    fn dialect_names_round_trip_through_from_str() {
        for dialect in SchemaDialect::ALL {
            assert_eq!(dialect.name().parse::<SchemaDialect>(), Ok(dialect));
        }
        assert_eq!("Postgres".parse(), Ok(SchemaDialect::PostgreSql));
        assert_eq!(
            "oracle".parse::<SchemaDialect>(),
            Err(UnknownDialect("oracle".to_string()))
        );
    }

    #[test]
    fn sql_parser_reports_syntax_errors_as_recoverable() {
        let parser = SqlParser::new(SchemaDialect::Generic);
        assert!(parser.parse_statement("CREATE TABLE t (id INT)").is_ok());
        assert!(matches!(
            parser.parse_statement("CREATE TABLE (oops"),
            Err(ParseFailure::Syntax(_))
        ));
    }
}
