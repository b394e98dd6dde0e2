use tracing::debug;

use crate::analyzer::naming::{
    entity_base, has_identifier_suffix, identifier_base, is_address_column,
    is_derived_value_column, is_descriptive_column, is_monetary_column,
};
use crate::analyzer::{NormalFormAnalyzer, SecondNormalForm};
use crate::generator::fix_sql;
use crate::model::issue::{Issue, IssueKind, NormalForm};
use crate::model::schema::{Column, Schema, Table};

/// Looks for non-key columns that depend on other non-key columns.
///
/// Runs [`SecondNormalForm`] first and returns its findings unchanged when
/// there are any.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThirdNormalForm {
    second: SecondNormalForm,
}

impl ThirdNormalForm {
    /// Analyzer gated on the given 2NF analyzer.
    pub fn new(second: SecondNormalForm) -> Self {
        Self { second }
    }
}

impl NormalFormAnalyzer for ThirdNormalForm {
    fn form(&self) -> NormalForm {
        NormalForm::Third
    }

    fn analyze(&self, schema: &Schema) -> Vec<Issue> {
        let second_issues = self.second.analyze(schema);
        if !second_issues.is_empty() {
            debug!("third normal form skipped: lower-form findings present");
            return second_issues;
        }

        let mut issues = Vec::new();
        for table in schema.tables() {
            let non_key = table.non_key_columns();
            if non_key.is_empty() {
                continue;
            }
            check_entity_groups(table, &non_key, &mut issues);
            check_code_name_pairs(table, &non_key, &mut issues);
            check_address_columns(table, &non_key, &mut issues);
            check_calculated_fields(table, &non_key, &mut issues);
            check_implicit_foreign_keys(table, &non_key, &mut issues);
        }
        issues
    }
}

/// Columns sharing an entity base where one of them identifies the entity.
fn check_entity_groups(table: &Table, non_key: &[&Column], issues: &mut Vec<Issue>) {
    let mut groups: Vec<(String, Vec<&Column>)> = Vec::new();
    for &column in non_key {
        let Some(base) = entity_base(&column.name).filter(|b| b.len() >= 2) else {
            continue;
        };
        match groups.iter_mut().find(|(existing, _)| *existing == base) {
            Some((_, members)) => members.push(column),
            None => groups.push((base, vec![column])),
        }
    }

    for (base, members) in groups {
        if members.len() < 2 {
            continue;
        }
        let Some(&determinant) = members.iter().find(|c| has_identifier_suffix(&c.name)) else {
            continue;
        };
        let dependents: Vec<&Column> = members
            .iter()
            .copied()
            .filter(|c| !c.has_name(&determinant.name))
            .collect();
        debug!(table = table.name(), entity = %base, "columns grouped under one entity");
        issues.push(transitive_dependency(table, determinant, &dependents));
    }
}

/// `<x>_id`/`<x>_code` next to `<x>_name`/`<x>_title`.
fn check_code_name_pairs(table: &Table, non_key: &[&Column], issues: &mut Vec<Issue>) {
    for &column in non_key {
        let Some(base) = identifier_base(&column.name).filter(|b| !b.is_empty()) else {
            continue;
        };
        let prefix = format!("{base}_");
        let labels: Vec<&Column> = non_key
            .iter()
            .copied()
            .filter(|c| {
                !c.has_name(&column.name)
                    && c.name.to_ascii_lowercase().starts_with(&prefix)
                    && is_descriptive_column(&c.name)
            })
            .collect();
        if labels.is_empty() {
            continue;
        }
        debug!(table = table.name(), code = %column.name, "code column with descriptive siblings");
        issues.push(transitive_dependency(table, column, &labels));
    }
}

fn check_address_columns(table: &Table, non_key: &[&Column], issues: &mut Vec<Issue>) {
    let address: Vec<&Column> = non_key
        .iter()
        .copied()
        .filter(|c| is_address_column(&c.name))
        .collect();
    if address.len() < 3 {
        return;
    }

    if let Some(&determinant) = address
        .iter()
        .find(|c| c.name.to_ascii_lowercase().ends_with("_id"))
    {
        let dependents: Vec<&Column> = address
            .iter()
            .copied()
            .filter(|c| !c.has_name(&determinant.name))
            .collect();
        issues.push(transitive_dependency(table, determinant, &dependents));
        return;
    }

    debug!(table = table.name(), columns = address.len(), "inline address");
    issues.push(
        Issue::new(
            NormalForm::Third,
            IssueKind::AddressDenormalization,
            table.name(),
            "Address information could be normalized into a separate table",
        )
        .with_columns(&names(&address))
        .with_suggestion("Consider moving the address columns into their own table")
        .with_fix_sql(fix_sql::address_table(table, &address)),
    );
}

fn check_calculated_fields(table: &Table, non_key: &[&Column], issues: &mut Vec<Issue>) {
    let monetary: Vec<&Column> = non_key
        .iter()
        .copied()
        .filter(|c| is_monetary_column(&c.name))
        .collect();
    if monetary.len() < 2 {
        return;
    }
    let derived: Vec<&Column> = monetary
        .iter()
        .copied()
        .filter(|c| is_derived_value_column(&c.name))
        .collect();
    if derived.is_empty() {
        return;
    }

    debug!(table = table.name(), columns = derived.len(), "possible calculated fields");
    issues.push(
        Issue::new(
            NormalForm::Third,
            IssueKind::CalculatedField,
            table.name(),
            "Potential calculated fields detected: these values may be derived from other columns",
        )
        .with_columns(&names(&derived))
        .with_suggestion(
            "Consider computing these values in queries or views instead of storing them",
        ),
    );
}

/// `<x>_id` columns that are not declared foreign keys but have `<x>_` siblings.
fn check_implicit_foreign_keys(table: &Table, non_key: &[&Column], issues: &mut Vec<Issue>) {
    for &column in non_key {
        let lower = column.name.to_ascii_lowercase();
        let Some(base) = lower.strip_suffix("_id").filter(|b| !b.is_empty()) else {
            continue;
        };
        if table.is_foreign_key_column(&column.name) {
            continue;
        }
        let prefix = format!("{base}_");
        let dependents: Vec<&Column> = non_key
            .iter()
            .copied()
            .filter(|c| !c.has_name(&column.name) && c.name.to_ascii_lowercase().starts_with(&prefix))
            .collect();
        if dependents.is_empty() {
            continue;
        }
        debug!(table = table.name(), column = %column.name, "identifier without declared foreign key");
        issues.push(transitive_dependency(table, column, &dependents));
    }
}

fn transitive_dependency(table: &Table, determinant: &Column, dependents: &[&Column]) -> Issue {
    Issue::new(
        NormalForm::Third,
        IssueKind::TransitiveDependency,
        table.name(),
        format!(
            "Potential transitive dependency detected: these columns may depend on non-key attribute {} rather than directly on the primary key",
            determinant.name
        ),
    )
    .with_columns(&names(dependents))
    .with_suggestion(format!(
        "Consider moving these columns to a separate table keyed by {}",
        determinant.name
    ))
    .with_fix_sql(fix_sql::dependency_table(
        table,
        determinant,
        dependents,
        &lookup_table_name(&determinant.name),
        "Move the transitively dependent columns into a lookup table",
    ))
}

/// `department_id` -> `department`.
fn lookup_table_name(determinant: &str) -> String {
    match determinant.rfind('_') {
        Some(idx) if idx > 0 => determinant[..idx].to_string(),
        _ => format!("{determinant}_lookup"),
    }
}

fn names<'a>(columns: &[&'a Column]) -> Vec<&'a str> {
    columns.iter().map(|c| c.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    fn analyze(sql: &str) -> Vec<Issue> {
        let built = parse_schema(sql).unwrap();
        ThirdNormalForm::default().analyze(&built.schema)
    }

    #[test]
    fn department_columns_depend_on_department_id() {
        let issues = analyze(
            "CREATE TABLE employees (employee_id INT PRIMARY KEY, name VARCHAR(100), \
             department_id INT, department_name VARCHAR(100), salary DECIMAL(10,2))",
        );
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| {
            i.kind == IssueKind::TransitiveDependency
                && i.column_name.as_deref() == Some("department_name")
        }));
        assert!(issues[0]
            .fix_sql
            .as_deref()
            .unwrap()
            .contains("CREATE TABLE department ("));
    }

    #[test]
    fn inline_address_without_identifier_gets_address_table() {
        let issues = analyze(
            "CREATE TABLE customers (customer_id INT PRIMARY KEY, street VARCHAR(100), \
             city VARCHAR(50), zip VARCHAR(10))",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::AddressDenormalization);
        assert_eq!(issues[0].column_name.as_deref(), Some("street, city, zip"));
        assert!(issues[0]
            .fix_sql
            .as_deref()
            .unwrap()
            .contains("CREATE TABLE customers_address ("));
    }

    #[test]
    fn address_identifier_becomes_the_determinant() {
        let issues = analyze(
            "CREATE TABLE customers (customer_id INT PRIMARY KEY, address_id INT, \
             street VARCHAR(100), city VARCHAR(50), zip VARCHAR(10))",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TransitiveDependency);
        assert_eq!(issues[0].column_name.as_deref(), Some("street, city, zip"));
        assert!(issues[0].description.contains("non-key attribute address_id"));
        assert!(issues[0]
            .fix_sql
            .as_deref()
            .unwrap()
            .contains("CREATE TABLE address ("));
    }

    #[test]
    fn calculated_fields_are_warnings_without_fix() {
        let issues = analyze(
            "CREATE TABLE invoices (invoice_id INT PRIMARY KEY, price DECIMAL(10,2), \
             tax DECIMAL(10,2), total DECIMAL(10,2))",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::CalculatedField);
        assert_eq!(issues[0].column_name.as_deref(), Some("total"));
        assert!(issues[0].fix_sql.is_none());
    }

    #[test]
    fn undeclared_identifier_columns_act_as_determinants() {
        let issues = analyze(
            "CREATE TABLE orders (order_id INT PRIMARY KEY, carrier_id INT, carrier_rank INT)",
        );
        assert!(!issues.is_empty());
        assert!(issues.iter().all(|i| {
            i.kind == IssueKind::TransitiveDependency
                && i.column_name.as_deref() == Some("carrier_rank")
                && i.description.contains("non-key attribute carrier_id")
        }));
    }

    #[test]
    fn declared_foreign_keys_are_not_implicit_determinants() {
        let declared = parse_schema(
            "CREATE TABLE staff (staff_id INT PRIMARY KEY, \
             team_id INT REFERENCES teams(team_id), team_rank INT)",
        )
        .unwrap();
        let table = &declared.schema.tables()[0];
        let mut issues = Vec::new();
        check_implicit_foreign_keys(table, &table.non_key_columns(), &mut issues);
        assert!(issues.is_empty());

        let undeclared = parse_schema(
            "CREATE TABLE staff (staff_id INT PRIMARY KEY, team_id INT, team_rank INT)",
        )
        .unwrap();
        let table = &undeclared.schema.tables()[0];
        check_implicit_foreign_keys(table, &table.non_key_columns(), &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column_name.as_deref(), Some("team_rank"));
    }

    #[test]
    fn lower_form_findings_are_returned_unchanged() {
        let issues = analyze("CREATE TABLE logs (message VARCHAR(10))");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].violated_form, NormalForm::First);
    }

    #[test]
    fn lookup_table_is_named_after_determinant_prefix() {
        assert_eq!(lookup_table_name("department_id"), "department");
        assert_eq!(lookup_table_name("region_code_no"), "region_code");
        assert_eq!(lookup_table_name("code"), "code_lookup");
    }
}
