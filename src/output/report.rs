use std::fmt::Write;

use crate::model::issue::{Issue, NormalForm};
use crate::model::result::AnalysisResult;
use crate::model::schema::Table;

/// Build a markdown report with a table summary and findings per normal form.
pub fn build_report(result: &AnalysisResult) -> String {
    let mut report = String::new();

    writeln!(report, "# Schema Normalization Report").unwrap();
    writeln!(report).unwrap();
    writeln!(
        report,
        "**Achieved normal form:** {}",
        result.achieved_form_label()
    )
    .unwrap();
    writeln!(report).unwrap();

    // Tables
    writeln!(report, "## Tables").unwrap();
    writeln!(report).unwrap();
    if result.schema().tables().is_empty() {
        writeln!(report, "_No tables found._").unwrap();
    } else {
        writeln!(report, "| Table | Columns | Primary key | Foreign keys |").unwrap();
        writeln!(report, "|-------|---------|-------------|--------------|").unwrap();
        for table in result.schema().tables() {
            writeln!(
                report,
                "| {} | {} | {} | {} |",
                escape_cell(table.name()),
                table.columns().len(),
                escape_cell(&primary_key_label(table)),
                table.foreign_keys().count()
            )
            .unwrap();
        }
    }

    for form in NormalForm::ALL {
        writeln!(report).unwrap();
        writeln!(report, "## {form} Issues").unwrap();
        writeln!(report).unwrap();
        let issues = result.issues(form);
        if issues.is_empty() {
            writeln!(report, "_None._").unwrap();
            continue;
        }
        writeln!(report, "| Table | Column(s) | Kind | Finding | Suggestion |").unwrap();
        writeln!(report, "|-------|-----------|------|---------|------------|").unwrap();
        for issue in issues {
            write_issue_row(&mut report, issue);
        }
    }

    // Skipped statements
    if !result.warnings().is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Parse Warnings").unwrap();
        writeln!(report).unwrap();
        for warning in result.warnings() {
            writeln!(
                report,
                "- statement #{}: {}",
                warning.statement_index, warning.message
            )
            .unwrap();
        }
    }

    report
}

fn write_issue_row(report: &mut String, issue: &Issue) {
    writeln!(
        report,
        "| {} | {} | {} | {} | {} |",
        escape_cell(&issue.table_name),
        escape_cell(issue.column_name.as_deref().unwrap_or("")),
        issue.kind.title(),
        escape_cell(&issue.description),
        escape_cell(issue.suggestion.as_deref().unwrap_or(""))
    )
    .unwrap();
}

fn primary_key_label(table: &Table) -> String {
    match table.primary_key() {
        Some(columns) => columns.join(", "),
        None => "(none)".to_string(),
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(|c: char| c == '\r' || c == '\n', " ")
}
