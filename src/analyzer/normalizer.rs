use std::collections::HashSet;

use tracing::{debug, info};

use crate::analyzer::{
    is_blocking, FirstNormalForm, NormalFormAnalyzer, SecondNormalForm, ThirdNormalForm,
};
use crate::error::SchemaAnalysisError;
use crate::model::issue::{Issue, NormalForm};
use crate::model::result::AnalysisResult;
use crate::model::schema::Schema;
use crate::parser::schema_builder::{build_schema, ParseWarning};
use crate::parser::sql_parser::{SchemaDialect, SqlParser, StatementParser};

/// Builds a schema from SQL and runs the normal-form analyzers in order.
#[derive(Debug, Clone, Default)]
pub struct Normalizer<P = SqlParser> {
    parser: P,
    first: FirstNormalForm,
    second: SecondNormalForm,
    third: ThirdNormalForm,
}

impl Normalizer<SqlParser> {
    /// Normalizer using the generic SQL dialect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer parsing with `dialect`.
    pub fn with_dialect(dialect: SchemaDialect) -> Self {
        Self::with_parser(SqlParser::new(dialect))
    }
}

impl<P: StatementParser> Normalizer<P> {
    /// Normalizer using a custom statement parser.
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            first: FirstNormalForm,
            second: SecondNormalForm::default(),
            third: ThirdNormalForm::default(),
        }
    }

    /// Parse `sql` and analyse the resulting schema.
    ///
    /// Malformed statements are skipped and reported as warnings on the
    /// result; only a fatal parser failure is returned as an error.
    pub fn analyze_schema(&self, sql: &str) -> Result<AnalysisResult, SchemaAnalysisError> {
        let built = build_schema(&self.parser, sql)?;
        Ok(self.evaluate(built.schema, built.warnings))
    }

    /// Analyse an already built schema.
    pub fn analyze(&self, schema: Schema) -> AnalysisResult {
        self.evaluate(schema, Vec::new())
    }

    fn evaluate(&self, schema: Schema, warnings: Vec<ParseWarning>) -> AnalysisResult {
        let first = self.first.analyze(&schema);
        let blocked = first.iter().any(is_blocking);

        let second = if blocked {
            Vec::new()
        } else {
            self.second.analyze(&schema)
        };
        let third = if blocked || !second.is_empty() {
            Vec::new()
        } else {
            deduplicate(self.third.analyze(&schema))
        };

        let achieved_form = if blocked {
            None
        } else if !second.is_empty() {
            Some(NormalForm::First)
        } else if !third.is_empty() {
            Some(NormalForm::Second)
        } else {
            Some(NormalForm::Third)
        };

        info!(
            tables = schema.tables().len(),
            first = first.len(),
            second = second.len(),
            third = third.len(),
            achieved = achieved_form.map_or("none", NormalForm::label),
            "normalization analysis complete"
        );
        AnalysisResult::new(schema, achieved_form, first, second, third, warnings)
    }
}

/// Analyse `sql` with the default parser.
pub fn analyze_schema(sql: &str) -> Result<AnalysisResult, SchemaAnalysisError> {
    Normalizer::new().analyze_schema(sql)
}

/// Drop repeated `(table, column, description)` findings, keeping the first.
pub fn deduplicate(issues: Vec<Issue>) -> Vec<Issue> {
    let before = issues.len();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let unique: Vec<Issue> = issues
        .into_iter()
        .filter(|issue| {
            seen.insert((
                issue.table_name.clone(),
                issue.column_name.clone().unwrap_or_default(),
                issue.description.clone(),
            ))
        })
        .collect();
    if unique.len() != before {
        debug!(removed = before - unique.len(), "duplicate findings removed");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, ParseFailure};
    use crate::model::issue::IssueKind;
    use sqlparser::ast::Statement;

    struct BrokenParser;

    impl StatementParser for BrokenParser {
        fn parse_statement(&self, _sql: &str) -> Result<Vec<Statement>, ParseFailure> {
            Err(ParseFailure::Fatal("parser unavailable".to_string()))
        }
    }

    #[test]
    fn fatal_parser_failure_becomes_schema_analysis_error() {
        let err = Normalizer::with_parser(BrokenParser)
            .analyze_schema("CREATE TABLE t (id INT PRIMARY KEY)")
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to analyze schema:"));
        assert!(matches!(err.cause(), BuildError::Parser { index: 0, .. }));
    }

    #[test]
    fn empty_script_is_in_third_normal_form() {
        let result = analyze_schema("").unwrap();
        assert_eq!(result.achieved_form(), Some(NormalForm::Third));
        assert!(!result.has_issues());
    }

    #[test]
    fn table_without_columns_is_analyzed() {
        let result = analyze_schema("CREATE TABLE e ()").unwrap();
        assert_eq!(result.schema().tables().len(), 1);
        assert!(result.schema().tables()[0].columns().is_empty());

        let first = result.issues(NormalForm::First);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, IssueKind::MissingPrimaryKey);
        assert_eq!(result.achieved_form(), None);
    }

    #[test]
    fn deduplicate_keeps_first_occurrence_in_order() {
        let make = |table: &str, column: Option<&str>, description: &str| {
            let issue = Issue::new(
                NormalForm::Third,
                IssueKind::TransitiveDependency,
                table,
                description,
            );
            match column {
                Some(column) => issue.with_column(column),
                None => issue,
            }
        };
        let issues = vec![
            make("a", Some("x"), "d1").with_suggestion("first"),
            make("a", Some("y"), "d1"),
            make("a", Some("x"), "d1").with_suggestion("second"),
            make("b", None, "d2"),
            make("b", None, "d2"),
        ];
        let unique = deduplicate(issues);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[0].suggestion.as_deref(), Some("first"));
        assert_eq!(unique[1].column_name.as_deref(), Some("y"));
        assert_eq!(unique[2].table_name, "b");
    }

    #[test]
    fn identifier_pair_groups_do_not_stop_higher_forms() {
        let result = analyze_schema(
            "CREATE TABLE accounts (account_id INT PRIMARY KEY, userid1 INT, userid2 INT)",
        )
        .unwrap();
        assert_eq!(result.issues(NormalForm::First).len(), 1);
        assert_eq!(result.achieved_form(), Some(NormalForm::Third));
    }

    #[test]
    fn analyzers_report_their_form() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.first.form(), NormalForm::First);
        assert_eq!(normalizer.second.form(), NormalForm::Second);
        assert_eq!(normalizer.third.form(), NormalForm::Third);
    }
}
