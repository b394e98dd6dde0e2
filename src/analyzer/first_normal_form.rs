use tracing::debug;

use crate::analyzer::naming::{
    element_type_for, is_multi_valued_type, is_numbered_variant, might_hold_structured_data,
    strip_trailing_digits,
};
use crate::analyzer::NormalFormAnalyzer;
use crate::generator::fix_sql;
use crate::model::issue::{Issue, IssueKind, NormalForm};
use crate::model::schema::{Column, Schema, Table};

/// Checks every table for a primary key, atomic column types, and repeating groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstNormalForm;

impl NormalFormAnalyzer for FirstNormalForm {
    fn form(&self) -> NormalForm {
        NormalForm::First
    }

    fn analyze(&self, schema: &Schema) -> Vec<Issue> {
        let mut issues = Vec::new();
        for table in schema.tables() {
            let before = issues.len();
            check_primary_key(table, &mut issues);
            check_atomic_columns(table, &mut issues);
            check_repeating_groups(table, &mut issues);
            debug!(
                table = table.name(),
                issues = issues.len() - before,
                "first normal form checked"
            );
        }
        issues
    }
}

fn check_primary_key(table: &Table, issues: &mut Vec<Issue>) {
    if table.has_primary_key() {
        return;
    }
    issues.push(
        Issue::new(
            NormalForm::First,
            IssueKind::MissingPrimaryKey,
            table.name(),
            "Table does not have a primary key",
        )
        .with_suggestion("Add a primary key column to uniquely identify each row")
        .with_fix_sql(fix_sql::add_surrogate_key(table)),
    );
}

fn check_atomic_columns(table: &Table, issues: &mut Vec<Issue>) {
    for column in table.columns() {
        if is_multi_valued_type(&column.data_type) {
            issues.push(
                Issue::new(
                    NormalForm::First,
                    IssueKind::MultiValuedColumn,
                    table.name(),
                    format!(
                        "Column type {} stores multiple values in a single field",
                        column.data_type
                    ),
                )
                .with_column(&column.name)
                .with_suggestion(
                    "Move the values into a separate table with one row per value",
                )
                .with_fix_sql(fix_sql::multi_valued_child_table(
                    table,
                    column,
                    element_type_for(&column.data_type),
                )),
            );
        } else if might_hold_structured_data(column) {
            issues.push(
                Issue::new(
                    NormalForm::First,
                    IssueKind::StructuredData,
                    table.name(),
                    format!(
                        "Column type {} might contain structured data",
                        column.data_type
                    ),
                )
                .with_column(&column.name)
                .with_suggestion(
                    "If the column holds lists or composite values, split them into separate columns or tables",
                ),
            );
        }
    }
}

fn check_repeating_groups(table: &Table, issues: &mut Vec<Issue>) {
    for base in repeating_group_bases(table) {
        let members: Vec<&Column> = table
            .columns()
            .iter()
            .filter(|c| is_numbered_variant(&c.name, &base))
            .collect();
        if members.len() < 2 || members.iter().all(|c| table.is_primary_key_column(&c.name)) {
            continue;
        }

        debug!(table = table.name(), base = %base, columns = members.len(), "repeating group");
        issues.push(
            Issue::new(
                NormalForm::First,
                IssueKind::RepeatingGroup,
                table.name(),
                format!("Potential repeating group detected: {base} columns"),
            )
            .with_columns(&members.iter().map(|c| c.name.as_str()).collect::<Vec<_>>())
            .with_suggestion(format!(
                "Move the {base} values into a separate table with one row per value"
            ))
            .with_fix_sql(fix_sql::repeating_group_child_table(table, &base, &members)),
        );
    }
}

/// Distinct digit-stripped names of non-key columns, in first-seen order.
fn repeating_group_bases(table: &Table) -> Vec<String> {
    let mut bases: Vec<String> = Vec::new();
    for column in table.columns() {
        if column.name.len() <= 2 || table.is_primary_key_column(&column.name) {
            continue;
        }
        let base = strip_trailing_digits(&column.name);
        if base.len() == column.name.len() || base.len() < 3 {
            continue;
        }
        let base = base.to_ascii_lowercase();
        if !bases.contains(&base) {
            bases.push(base);
        }
    }
    bases
}
