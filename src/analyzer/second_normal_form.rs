use tracing::debug;

use crate::analyzer::naming::{relates_to_referenced_table, strip_id_suffix};
use crate::analyzer::{is_blocking, FirstNormalForm, NormalFormAnalyzer};
use crate::generator::fix_sql;
use crate::model::issue::{Issue, IssueKind, NormalForm};
use crate::model::schema::{Column, ForeignKey, Schema, Table};

/// Looks for non-key columns that depend on only part of the primary key.
///
/// Runs [`FirstNormalForm`] first and returns its findings unchanged when any
/// of them is blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondNormalForm {
    first: FirstNormalForm,
}

impl SecondNormalForm {
    /// Analyzer gated on the given 1NF analyzer.
    pub fn new(first: FirstNormalForm) -> Self {
        Self { first }
    }
}

impl NormalFormAnalyzer for SecondNormalForm {
    fn form(&self) -> NormalForm {
        NormalForm::Second
    }

    fn analyze(&self, schema: &Schema) -> Vec<Issue> {
        let first_issues = self.first.analyze(schema);
        if first_issues.iter().any(is_blocking) {
            debug!("second normal form skipped: blocking 1NF findings");
            return first_issues;
        }

        let mut issues = Vec::new();
        for table in schema.tables() {
            let key = table.primary_key_columns();
            if key.len() > 1 {
                check_composite_key(table, &key, &mut issues);
            } else {
                check_foreign_key_dependencies(table, &mut issues);
            }
        }
        issues
    }
}

fn check_composite_key(table: &Table, key: &[&Column], issues: &mut Vec<Issue>) {
    for fk in table.foreign_keys() {
        if !fk.columns.iter().any(|c| table.is_primary_key_column(c)) {
            continue;
        }
        let dependents = foreign_key_dependents(table, fk);
        if dependents.is_empty() {
            continue;
        }
        debug!(table = table.name(), fk = %fk.columns.join(","), "partial dependency via foreign key");
        issues.push(foreign_key_issue(
            table,
            fk,
            &dependents,
            "(part of the primary key) rather than the full primary key",
        ));
    }

    let non_key = table.non_key_columns();

    for key_column in key {
        let lower = key_column.name.to_ascii_lowercase();
        let Some(base) = lower.strip_suffix("_id") else {
            continue;
        };
        if base.len() < 2 {
            continue;
        }
        let marker = format!("{base}_");
        let dependents: Vec<&Column> = non_key
            .iter()
            .copied()
            .filter(|c| c.name.to_ascii_lowercase().contains(&marker))
            .collect();
        if dependents.is_empty() {
            continue;
        }
        debug!(table = table.name(), key = %key_column.name, "partial dependency via key column");
        issues.push(key_column_issue(
            table,
            key_column,
            &dependents,
            "these columns may depend on",
            base,
        ));
    }

    for &column in &non_key {
        let lower = column.name.to_ascii_lowercase();
        let determinant = key.iter().find(|key_column| {
            let base = strip_id_suffix(&key_column.name);
            base.len() >= 3
                && (lower.starts_with(&format!("{base}_")) || lower.contains(&format!("_{base}_")))
        });
        if let Some(key_column) = determinant {
            let base = strip_id_suffix(&key_column.name);
            issues.push(key_column_issue(
                table,
                key_column,
                &[column],
                "this column may depend on",
                &base,
            ));
        }
    }
}

fn check_foreign_key_dependencies(table: &Table, issues: &mut Vec<Issue>) {
    for fk in table.foreign_keys() {
        let dependents = foreign_key_dependents(table, fk);
        if dependents.is_empty() {
            continue;
        }
        debug!(table = table.name(), fk = %fk.columns.join(","), "dependency via foreign key");
        issues.push(foreign_key_issue(
            table,
            fk,
            &dependents,
            "rather than the primary key",
        ));
    }
}

/// Non-key columns outside every foreign key whose name points at `fk`'s target.
fn foreign_key_dependents<'a>(table: &'a Table, fk: &ForeignKey) -> Vec<&'a Column> {
    table
        .non_key_columns()
        .into_iter()
        .filter(|c| !table.is_foreign_key_column(&c.name))
        .filter(|c| relates_to_referenced_table(&c.name, fk))
        .collect()
}

fn foreign_key_issue(table: &Table, fk: &ForeignKey, dependents: &[&Column], scope: &str) -> Issue {
    let determinant = fk.columns.join(", ");
    Issue::new(
        NormalForm::Second,
        IssueKind::PartialDependency,
        table.name(),
        format!(
            "Potential partial dependency detected: these columns may depend on {determinant} {scope}"
        ),
    )
    .with_columns(&dependents.iter().map(|c| c.name.as_str()).collect::<Vec<_>>())
    .with_suggestion(format!(
        "Consider moving these columns to a separate table keyed by {determinant}"
    ))
    .with_fix_sql(fix_sql::partial_dependency_on_foreign_key(table, fk, dependents))
}

fn key_column_issue(
    table: &Table,
    key_column: &Column,
    dependents: &[&Column],
    subject: &str,
    base: &str,
) -> Issue {
    Issue::new(
        NormalForm::Second,
        IssueKind::PartialDependency,
        table.name(),
        format!(
            "Potential partial dependency detected: {subject} {} (part of the primary key) rather than the full primary key",
            key_column.name
        ),
    )
    .with_columns(&dependents.iter().map(|c| c.name.as_str()).collect::<Vec<_>>())
    .with_suggestion(format!(
        "Consider moving {} to a separate table keyed by {}",
        if dependents.len() == 1 { "this column" } else { "these columns" },
        key_column.name
    ))
    .with_fix_sql(fix_sql::dependency_table(
        table,
        key_column,
        dependents,
        &format!("{}_{base}", table.name()),
        "Move the partially dependent columns into their own table",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    fn analyze(sql: &str) -> Vec<Issue> {
        let built = parse_schema(sql).unwrap();
        SecondNormalForm::default().analyze(&built.schema)
    }

    #[test]
    fn blocking_first_form_findings_are_returned_unchanged() {
        let issues = analyze(
            "CREATE TABLE order_items (order_id INT, product_id INT, product_name VARCHAR(100))",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].violated_form, NormalForm::First);
        assert_eq!(issues[0].kind, IssueKind::MissingPrimaryKey);
    }

    #[test]
    fn structured_data_warnings_do_not_gate() {
        let issues = analyze(
            "CREATE TABLE order_items (order_id INT, product_id INT, product_name VARCHAR(100), \
             payload TEXT, PRIMARY KEY (order_id, product_id))",
        );
        assert!(issues
            .iter()
            .all(|i| i.violated_form == NormalForm::Second));
        assert!(!issues.is_empty());
    }

    #[test]
    fn composite_key_reports_group_and_single_column_findings() {
        let issues = analyze(
            "CREATE TABLE order_items (order_id INT, product_id INT, quantity INT, \
             product_name VARCHAR(100), PRIMARY KEY (order_id, product_id))",
        );
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|i| i.column_name.as_deref() == Some("product_name")));
        assert_eq!(
            issues[0].description,
            "Potential partial dependency detected: these columns may depend on product_id \
             (part of the primary key) rather than the full primary key"
        );
        assert!(issues[1].description.starts_with(
            "Potential partial dependency detected: this column may depend on product_id"
        ));
        assert!(issues[0]
            .fix_sql
            .as_deref()
            .unwrap()
            .contains("CREATE TABLE order_items_product ("));
    }

    #[test]
    fn foreign_key_inside_composite_key_excludes_key_columns() {
        let issues = analyze(
            "CREATE TABLE enrollments (student_id INT REFERENCES students(id), course_code INT, \
             student_email VARCHAR(200), grade CHAR(2), PRIMARY KEY (student_id, course_code))",
        );
        let via_fk: Vec<_> = issues
            .iter()
            .filter(|i| i.description.contains("may depend on student_id (part"))
            .collect();
        assert!(!via_fk.is_empty());
        assert_eq!(via_fk[0].column_name.as_deref(), Some("student_email"));
        assert!(via_fk[0]
            .fix_sql
            .as_deref()
            .unwrap()
            .contains("REFERENCES students(id)"));
    }

    #[test]
    fn single_key_tables_check_foreign_key_targets() {
        let issues = analyze(
            "CREATE TABLE customers (customer_id INT PRIMARY KEY);
             CREATE TABLE orders (order_id INT PRIMARY KEY, customer_id INT, customer_name VARCHAR(100),
               FOREIGN KEY (customer_id) REFERENCES customers (customer_id));",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].table_name, "orders");
        assert_eq!(issues[0].column_name.as_deref(), Some("customer_name"));
        assert!(issues[0].description.ends_with("customer_id rather than the primary key"));
    }

    #[test]
    fn clean_schema_has_no_partial_dependencies() {
        let issues = analyze(
            "CREATE TABLE order_items (order_id INT, product_id INT, quantity INT, \
             PRIMARY KEY (order_id, product_id))",
        );
        assert!(issues.is_empty());
    }
}
