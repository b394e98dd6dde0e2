use serde::Serialize;
use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, CreateTable, Expr, ObjectName, Statement,
    TableConstraint,
};
use tracing::{debug, info, warn};

use crate::error::{BuildError, ModelError, ParseFailure};
use crate::model::schema::{Column, Constraint, ForeignKey, Schema, Table};
use crate::parser::expr::referenced_column_names;
use crate::parser::names::{key_column_name, relation_name};
use crate::parser::sql_parser::{split_statements, StatementParser};

/// Name given to schemas built from a script.
pub const DEFAULT_SCHEMA_NAME: &str = "parsed_schema";

/// A statement that was skipped, or an element dropped from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    /// Zero-based position of the statement in the script.
    pub statement_index: usize,
    /// The statement text, trimmed.
    pub statement: String,
    /// Why it was skipped or altered.
    pub message: String,
}

/// A schema together with the warnings collected while building it.
#[derive(Debug, Clone)]
pub struct BuiltSchema {
    /// The resolved schema.
    pub schema: Schema,
    /// Skipped statements and dropped elements, in script order.
    pub warnings: Vec<ParseWarning>,
}

/// Split `script` into statements, parse each one, and build a schema.
///
/// Malformed statements are skipped with a warning. Only a
/// [`ParseFailure::Fatal`] aborts the build.
pub fn build_schema<P: StatementParser + ?Sized>(
    parser: &P,
    script: &str,
) -> Result<BuiltSchema, BuildError> {
    let mut builder = SchemaBuilder::new(DEFAULT_SCHEMA_NAME);

    for (index, text) in split_statements(script).into_iter().enumerate() {
        match parser.parse_statement(text) {
            Ok(statements) => {
                for statement in &statements {
                    builder.add_statement(index, text, statement);
                }
            }
            Err(ParseFailure::Syntax(err)) => builder.warn(index, text, err.to_string()),
            Err(ParseFailure::Fatal(message)) => {
                return Err(BuildError::Parser { index, message });
            }
        }
    }

    let built = builder.finish();
    info!(
        tables = built.schema.tables().len(),
        warnings = built.warnings.len(),
        "schema built"
    );
    Ok(built)
}

/// Accumulates tables from parsed statements.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
    warnings: Vec<ParseWarning>,
}

impl SchemaBuilder {
    /// An empty builder for a schema called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: Schema::new(name),
            warnings: Vec::new(),
        }
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Apply one parsed statement.
    ///
    /// `CREATE TABLE` adds a table and `ALTER TABLE ... ADD CONSTRAINT` extends
    /// one. Every other statement is ignored.
    pub fn add_statement(&mut self, index: usize, text: &str, statement: &Statement) {
        match statement {
            Statement::CreateTable(create) => {
                let (table, problems) = table_from_create(create);
                for problem in problems {
                    self.warn(index, text, problem.to_string());
                }
                debug!(
                    table = table.name(),
                    columns = table.columns().len(),
                    constraints = table.constraints().len(),
                    "table parsed"
                );
                if let Err(problem) = self.schema.add_table(table) {
                    self.warn(index, text, problem.to_string());
                }
            }
            Statement::AlterTable {
                name, operations, ..
            } => self.alter_table(index, text, name, operations),
            other => debug!(statement = index, kind = %statement_kind(other), "ignoring statement"),
        }
    }

    /// Resolve relationships and return the schema with its warnings.
    pub fn finish(mut self) -> BuiltSchema {
        self.schema.resolve_relationships();
        BuiltSchema {
            schema: self.schema,
            warnings: self.warnings,
        }
    }

    fn warn(&mut self, index: usize, text: &str, message: String) {
        warn!(statement = index, %message, "statement skipped or altered");
        self.warnings.push(ParseWarning {
            statement_index: index,
            statement: text.trim().to_string(),
            message,
        });
    }

    fn alter_table(
        &mut self,
        index: usize,
        text: &str,
        name: &ObjectName,
        operations: &[AlterTableOperation],
    ) {
        let target = relation_name(&name.to_string());
        let Some(table) = self.schema.table_mut(&target) else {
            self.warn(
                index,
                text,
                format!("ALTER TABLE targets unknown table '{target}'"),
            );
            return;
        };

        let mut problems = Vec::new();
        for operation in operations {
            let AlterTableOperation::AddConstraint { constraint, .. } = operation else {
                debug!(table = %target, "ignoring ALTER TABLE operation");
                continue;
            };
            if let Some(constraint) = constraint_from_table_constraint(constraint, table) {
                if let Err(problem) = table.add_constraint(constraint) {
                    problems.push(problem);
                }
            }
        }
        for problem in problems {
            self.warn(index, text, problem.to_string());
        }
    }
}

fn statement_kind(statement: &Statement) -> String {
    let text = statement.to_string();
    text.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

fn table_from_create(create: &CreateTable) -> (Table, Vec<ModelError>) {
    let table_name = relation_name(&create.name.to_string());
    let mut table = Table::new(table_name.clone());
    let mut problems = Vec::new();
    let mut inline_key = Vec::new();
    let mut inline_constraints = Vec::new();

    for def in &create.columns {
        let column = column_from_def(def);
        for option in &def.options {
            let name = option.name.as_ref().map(|n| n.value.clone());
            match &option.option {
                ColumnOption::Unique {
                    is_primary: true, ..
                } => inline_key.push(column.name.clone()),
                ColumnOption::Unique {
                    is_primary: false, ..
                } => inline_constraints.push(Constraint::Unique {
                    name,
                    columns: vec![column.name.clone()],
                }),
                ColumnOption::ForeignKey {
                    foreign_table,
                    referred_columns,
                    ..
                } => inline_constraints.push(Constraint::ForeignKey(ForeignKey {
                    name,
                    columns: vec![column.name.clone()],
                    referenced_table: relation_name(&foreign_table.to_string()),
                    referenced_columns: referred_columns
                        .iter()
                        .map(|c| key_column_name(&c.to_string()))
                        .collect(),
                })),
                ColumnOption::Check(expr) => inline_constraints.push(Constraint::Check {
                    name,
                    columns: vec![column.name.clone()],
                    expression: expr.to_string(),
                }),
                _ => {}
            }
        }
        if let Err(problem) = table.add_column(column) {
            problems.push(problem);
        }
    }

    if !inline_key.is_empty() {
        let key = Constraint::PrimaryKey {
            name: Some(format!("pk_{table_name}")),
            columns: inline_key,
        };
        if let Err(problem) = table.add_constraint(key) {
            problems.push(problem);
        }
    }
    for constraint in inline_constraints {
        if let Err(problem) = table.add_constraint(constraint) {
            problems.push(problem);
        }
    }
    for constraint in &create.constraints {
        if let Some(constraint) = constraint_from_table_constraint(constraint, &table) {
            if let Err(problem) = table.add_constraint(constraint) {
                problems.push(problem);
            }
        }
    }

    (table, problems)
}

fn column_from_def(def: &ColumnDef) -> Column {
    let nullable = !def
        .options
        .iter()
        .any(|o| matches!(o.option, ColumnOption::NotNull));
    let default_value = def.options.iter().find_map(|o| match &o.option {
        ColumnOption::Default(expr) => Some(expr.to_string()),
        _ => None,
    });
    Column {
        name: def.name.value.clone(),
        data_type: def.data_type.to_string(),
        nullable,
        default_value,
    }
}

fn constraint_from_table_constraint(constraint: &TableConstraint, table: &Table) -> Option<Constraint> {
    match constraint {
        TableConstraint::PrimaryKey { name, columns, .. } => Some(Constraint::PrimaryKey {
            name: name.as_ref().map(|n| n.value.clone()),
            columns: columns.iter().map(|c| key_column_name(&c.to_string())).collect(),
        }),
        TableConstraint::Unique { name, columns, .. } => Some(Constraint::Unique {
            name: name.as_ref().map(|n| n.value.clone()),
            columns: columns.iter().map(|c| key_column_name(&c.to_string())).collect(),
        }),
        TableConstraint::ForeignKey {
            name,
            columns,
            foreign_table,
            referred_columns,
            ..
        } => Some(Constraint::ForeignKey(ForeignKey {
            name: name.as_ref().map(|n| n.value.clone()),
            columns: columns.iter().map(|c| key_column_name(&c.to_string())).collect(),
            referenced_table: relation_name(&foreign_table.to_string()),
            referenced_columns: referred_columns
                .iter()
                .map(|c| key_column_name(&c.to_string()))
                .collect(),
        })),
        TableConstraint::Check { name, expr, .. } => {
            let expr: &Expr = expr;
            Some(Constraint::Check {
                name: name.as_ref().map(|n| n.value.clone()),
                columns: check_columns(expr, table),
                expression: expr.to_string(),
            })
        }
        _ => None,
    }
}

/// Table columns mentioned by a check expression, spelled as declared.
fn check_columns(expr: &Expr, table: &Table) -> Vec<String> {
    referenced_column_names(expr)
        .into_iter()
        .filter_map(|name| table.find_column(&name).map(|c| c.name.clone()))
        .collect()
}
