//! Corrective DDL attached to individual issues.
//!
//! Only `CREATE TABLE` and the surrogate-key `ALTER TABLE` are executable.
//! Data migration, new foreign keys, and `DROP COLUMN` steps are emitted as
//! `--` comments for a human to review. Every identifier goes through
//! [`quote_identifier`] so a generated statement always stays on one line.

use crate::model::schema::{Column, ForeignKey, Table};
use crate::parser::names::quote_identifier;

const INDENT: &str = "    ";

/// `text` as SQL comment lines, each input line getting its own `-- ` prefix.
pub(crate) fn comment_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty())
        .map(|line| format!("-- {line}"))
}

#[derive(Debug, Default)]
struct FixScript {
    lines: Vec<String>,
}

impl FixScript {
    fn comment(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.lines.extend(comment_lines(text.as_ref()));
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    fn create_table(&mut self, name: &str, body: &[String]) -> &mut Self {
        self.lines
            .push(format!("CREATE TABLE {} (", quote_identifier(name)));
        let last = body.len().saturating_sub(1);
        for (idx, line) in body.iter().enumerate() {
            let separator = if idx == last { "" } else { "," };
            self.lines.push(format!("{INDENT}{line}{separator}"));
        }
        self.lines.push(");".to_string());
        self
    }

    fn drop_columns(&mut self, table: &str, columns: impl IntoIterator<Item = String>) {
        self.blank()
            .comment("After migration, drop the moved columns:");
        for column in columns {
            self.comment(format!("ALTER TABLE {table} DROP COLUMN {column};"));
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn ident(name: &str) -> String {
    quote_identifier(name).into_owned()
}

fn single_line(text: &str) -> String {
    text.replace(|c: char| c == '\r' || c == '\n', " ")
}

/// Key the original table exposes to a new child table: its single primary
/// key column, or a surrogate `id INT`.
fn parent_key(table: &Table) -> (String, String) {
    match table.primary_key_columns().as_slice() {
        [column] => (ident(&column.name), single_line(&column.data_type)),
        _ => ("id".to_string(), "INT".to_string()),
    }
}

/// Column definition for a column of `table`, `name INT` if it is not declared.
fn definition_of(table: &Table, name: &str) -> String {
    table
        .find_column(name)
        .map_or_else(|| format!("{} INT", ident(name)), Column::definition)
}

fn names(columns: &[&Column]) -> Vec<String> {
    columns.iter().map(|c| ident(&c.name)).collect()
}

fn joined(columns: &[&Column]) -> String {
    names(columns).join(", ")
}

/// Adds a surrogate primary key.
pub fn add_surrogate_key(table: &Table) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN id INT AUTO_INCREMENT PRIMARY KEY;",
        quote_identifier(table.name())
    )
}

/// Moves a multi-valued column into a child table with one row per element.
pub fn multi_valued_child_table(table: &Table, column: &Column, element_type: &str) -> String {
    let parent = ident(table.name());
    let child = format!("{}_{}", table.name(), column.name);
    let (key, key_type) = parent_key(table);
    let link = ident(&format!("{}_id", table.name()));
    let value = ident(&format!("{}_value", column.name));
    let value_definition = if column.nullable {
        format!("{value} {element_type}")
    } else {
        format!("{value} {element_type} NOT NULL")
    };

    let mut script = FixScript::default();
    script
        .comment("Move the multi-valued attribute into its own table")
        .create_table(
            &child,
            &[
                "id INT AUTO_INCREMENT PRIMARY KEY".to_string(),
                format!("{link} {key_type} NOT NULL"),
                value_definition,
                format!("FOREIGN KEY ({link}) REFERENCES {parent}({key})"),
            ],
        )
        .blank()
        .comment("Data migration (review before running):")
        .comment(format!("INSERT INTO {} ({link}, {value})", ident(&child)))
        .comment(format!(
            "SELECT {key}, <one row per element of {}> FROM {parent};",
            ident(&column.name)
        ));
    script.drop_columns(&parent, [ident(&column.name)]);
    script.finish()
}

/// Moves numbered columns (`phone1`, `phone2`, ...) into a child table.
pub fn repeating_group_child_table(table: &Table, base: &str, columns: &[&Column]) -> String {
    let parent = ident(table.name());
    let child = format!("{}_{base}", table.name());
    let (key, key_type) = parent_key(table);
    let link = ident(&format!("{}_id", table.name()));
    let value = ident(&format!("{base}_value"));
    let value_type = columns
        .first()
        .map_or_else(|| "VARCHAR(255)".to_string(), |c| single_line(&c.data_type));

    let mut script = FixScript::default();
    script
        .comment("Move the repeating group into its own table")
        .create_table(
            &child,
            &[
                "id INT AUTO_INCREMENT PRIMARY KEY".to_string(),
                format!("{link} {key_type} NOT NULL"),
                format!("{value} {value_type}"),
                format!("FOREIGN KEY ({link}) REFERENCES {parent}({key})"),
            ],
        )
        .blank()
        .comment("Data migration (review before running):");
    let child = ident(&child);
    for name in names(columns) {
        script.comment(format!(
            "INSERT INTO {child} ({link}, {value}) SELECT {key}, {name} FROM {parent} WHERE {name} IS NOT NULL;"
        ));
    }
    script.drop_columns(&parent, names(columns));
    script.finish()
}

/// Moves columns that depend on a foreign key inside the primary key into a
/// table keyed by that foreign key.
pub fn partial_dependency_on_foreign_key(
    table: &Table,
    fk: &ForeignKey,
    dependents: &[&Column],
) -> String {
    let source = ident(table.name());
    let target = format!("{}_{}", table.name(), fk.referenced_table);
    let key = fk
        .columns
        .iter()
        .map(|c| ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let referenced = ident(&fk.referenced_table);

    let mut body: Vec<String> = fk
        .columns
        .iter()
        .map(|c| definition_of(table, c))
        .collect();
    body.extend(dependents.iter().map(|c| c.definition()));
    body.push(format!("PRIMARY KEY ({key})"));
    if fk.referenced_columns.is_empty() {
        body.push(format!("FOREIGN KEY ({key}) REFERENCES {referenced}"));
    } else {
        let referenced_columns = fk
            .referenced_columns
            .iter()
            .map(|c| ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        body.push(format!(
            "FOREIGN KEY ({key}) REFERENCES {referenced}({referenced_columns})"
        ));
    }

    let mut script = FixScript::default();
    script
        .comment("Move the partially dependent columns into their own table")
        .create_table(&target, &body)
        .blank()
        .comment("Data migration (review before running):")
        .comment(format!(
            "INSERT INTO {} ({key}, {})",
            ident(&target),
            joined(dependents)
        ))
        .comment(format!(
            "SELECT DISTINCT {key}, {} FROM {source};",
            joined(dependents)
        ));
    script.drop_columns(&source, names(dependents));
    script.finish()
}

/// Moves columns that depend on a single column into a table keyed by it.
///
/// `determinant` is a primary key column for partial dependencies and a
/// non-key column for transitive ones; `target` names the new table.
pub fn dependency_table(
    table: &Table,
    determinant: &Column,
    dependents: &[&Column],
    target: &str,
    heading: &str,
) -> String {
    let source = ident(table.name());
    let key = ident(&determinant.name);
    let target_name = ident(target);

    let mut body = vec![format!("{} PRIMARY KEY", determinant.definition())];
    body.extend(dependents.iter().map(|c| c.definition()));

    let mut script = FixScript::default();
    script
        .comment(heading)
        .create_table(target, &body)
        .blank()
        .comment("Data migration (review before running):")
        .comment(format!(
            "INSERT INTO {target_name} ({key}, {})",
            joined(dependents)
        ))
        .comment(format!(
            "SELECT DISTINCT {key}, {} FROM {source};",
            joined(dependents)
        ))
        .blank()
        .comment("Link the original table to the new one:")
        .comment(format!(
            "ALTER TABLE {source} ADD FOREIGN KEY ({key}) REFERENCES {target_name}({key});"
        ));
    script.drop_columns(&source, names(dependents));
    script.finish()
}

/// Moves inline address columns into a child address table.
pub fn address_table(table: &Table, columns: &[&Column]) -> String {
    let parent = ident(table.name());
    let target = format!("{}_address", table.name());
    let (key, key_type) = parent_key(table);
    let link = ident(&format!("{}_id", table.name()));

    let mut body = vec![
        "id INT AUTO_INCREMENT PRIMARY KEY".to_string(),
        format!("{link} {key_type} NOT NULL"),
    ];
    body.extend(columns.iter().map(|c| c.definition()));
    body.push(format!("FOREIGN KEY ({link}) REFERENCES {parent}({key})"));

    let mut script = FixScript::default();
    script
        .comment("Move the address columns into their own table")
        .create_table(&target, &body)
        .blank()
        .comment("Data migration (review before running):")
        .comment(format!(
            "INSERT INTO {} ({link}, {})",
            ident(&target),
            joined(columns)
        ))
        .comment(format!(
            "SELECT {key}, {} FROM {parent};",
            joined(columns)
        ));
    script.drop_columns(&parent, names(columns));
    script.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schema::Constraint;

    fn employees() -> Table {
        let mut table = Table::new("employees");
        for column in [
            Column::new("employee_id", "INT"),
            Column::new("department_id", "INT"),
            Column::new("department_name", "VARCHAR(100)"),
        ] {
            table.add_column(column).unwrap();
        }
        table
            .add_constraint(Constraint::PrimaryKey {
                name: None,
                columns: vec!["employee_id".to_string()],
            })
            .unwrap();
        table
    }

    #[test]
    fn dependency_table_creates_lookup_and_comments_out_migration() {
        let table = employees();
        let determinant = table.find_column("department_id").unwrap();
        let dependents = [table.find_column("department_name").unwrap()];
        let sql = dependency_table(
            &table,
            determinant,
            &dependents,
            "department",
            "Move the transitively dependent columns into a lookup table",
        );

        assert_eq!(
            sql,
            "-- Move the transitively dependent columns into a lookup table\n\
             CREATE TABLE department (\n    \
             department_id INT PRIMARY KEY,\n    \
             department_name VARCHAR(100)\n\
             );\n\
             \n\
             -- Data migration (review before running):\n\
             -- INSERT INTO department (department_id, department_name)\n\
             -- SELECT DISTINCT department_id, department_name FROM employees;\n\
             \n\
             -- Link the original table to the new one:\n\
             -- ALTER TABLE employees ADD FOREIGN KEY (department_id) REFERENCES department(department_id);\n\
             \n\
             -- After migration, drop the moved columns:\n\
             -- ALTER TABLE employees DROP COLUMN department_name;"
        );
    }

    #[test]
    fn multi_valued_child_table_links_to_single_column_key() {
        let mut table = employees();
        table
            .add_column(Column::new("skills", "SET('sql','rust')").not_null())
            .unwrap();
        let column = table.find_column("skills").unwrap();
        let sql = multi_valued_child_table(&table, column, "TEXT");

        assert!(sql.contains("CREATE TABLE employees_skills ("));
        assert!(sql.contains("    employees_id INT NOT NULL,"));
        assert!(sql.contains("    skills_value TEXT NOT NULL,"));
        assert!(sql.contains("FOREIGN KEY (employees_id) REFERENCES employees(employee_id)"));
        assert!(sql.contains("-- ALTER TABLE employees DROP COLUMN skills;"));
    }

    #[test]
    fn surrogate_key_is_executable() {
        assert_eq!(
            add_surrogate_key(&Table::new("logs")),
            "ALTER TABLE logs ADD COLUMN id INT AUTO_INCREMENT PRIMARY KEY;"
        );
    }

    #[test]
    fn partial_dependency_fix_references_the_foreign_table() {
        let mut table = Table::new("enrollments");
        for column in [
            Column::new("student_id", "INT").not_null(),
            Column::new("course_id", "INT").not_null(),
            Column::new("student_email", "VARCHAR(200)"),
        ] {
            table.add_column(column).unwrap();
        }
        let fk = ForeignKey {
            name: None,
            columns: vec!["student_id".to_string()],
            referenced_table: "students".to_string(),
            referenced_columns: vec!["id".to_string()],
        };
        let dependents = [table.find_column("student_email").unwrap()];
        let sql = partial_dependency_on_foreign_key(&table, &fk, &dependents);

        assert!(sql.contains("CREATE TABLE enrollments_students ("));
        assert!(sql.contains("    student_id INT NOT NULL,"));
        assert!(sql.contains("    PRIMARY KEY (student_id),"));
        assert!(sql.contains("    FOREIGN KEY (student_id) REFERENCES students(id)\n);"));
        assert!(sql.contains("-- SELECT DISTINCT student_id, student_email FROM enrollments;"));
    }

    #[test]
    fn comment_lines_prefix_every_line() {
        let lines: Vec<String> = comment_lines("first\nsecond\r\nthird\rfourth").collect();
        assert_eq!(lines, ["-- first", "-- second", "-- third", "-- fourth"]);
    }

    #[test]
    fn awkward_identifiers_are_quoted_on_one_line() {
        let mut table = Table::new("t");
        table.add_column(Column::new("id", "INT")).unwrap();
        table
            .add_column(Column::new("odd\nDROP TABLE t; name", "INT"))
            .unwrap();
        table
            .add_constraint(Constraint::PrimaryKey {
                name: None,
                columns: vec!["id".to_string()],
            })
            .unwrap();
        let column = table.find_column("odd\nDROP TABLE t; name").unwrap();
        let sql = multi_valued_child_table(&table, column, "INT");

        assert!(sql.contains("CREATE TABLE \"t_odd DROP TABLE t; name\" ("));
        assert!(sql.contains("-- ALTER TABLE t DROP COLUMN \"odd DROP TABLE t; name\";"));
        assert!(sql
            .lines()
            .filter(|line| !line.starts_with("--"))
            .all(|line| !line.starts_with("DROP")));
    }

}
