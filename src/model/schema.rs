use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::ModelError;
use crate::parser::names::{normalize_identifier, quote_identifier, same_identifier};

/// A column declared in a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Column name as written (unquoted).
    pub name: String,
    /// Declared type, rendered as text, e.g. `VARCHAR(100)`.
    pub data_type: String,
    /// `false` only when the column is declared `NOT NULL`.
    pub nullable: bool,
    /// Verbatim `DEFAULT` expression, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Column {
    /// A nullable column without a default.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default_value: None,
        }
    }

    /// Mark the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Attach a default expression.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        same_identifier(&self.name, name)
    }

    /// `name TYPE[ NOT NULL]`, as used inside generated `CREATE TABLE` bodies.
    pub fn definition(&self) -> String {
        let name = quote_identifier(&self.name);
        let data_type = self.data_type.replace(|c: char| c == '\r' || c == '\n', " ");
        if self.nullable {
            format!("{name} {data_type}")
        } else {
            format!("{name} {data_type} NOT NULL")
        }
    }
}

/// A foreign key declared on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Constraint name, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referencing columns on the declaring table.
    pub columns: Vec<String>,
    /// Name of the referenced table.
    pub referenced_table: String,
    /// Referenced columns, paired positionally with `columns`.
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Whether `column` is one of the referencing columns.
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| same_identifier(c, column))
    }
}

/// A table-level or column-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// `PRIMARY KEY (...)`.
    PrimaryKey {
        /// Constraint name, when declared.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Key columns in declaration order.
        columns: Vec<String>,
    },
    /// `FOREIGN KEY (...) REFERENCES ...`.
    ForeignKey(ForeignKey),
    /// `UNIQUE (...)`.
    Unique {
        /// Constraint name, when declared.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Columns covered by the constraint.
        columns: Vec<String>,
    },
    /// `CHECK (...)`.
    Check {
        /// Constraint name, when declared.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Table columns mentioned by the expression.
        columns: Vec<String>,
        /// The check expression as SQL text.
        expression: String,
    },
}

impl Constraint {
    /// Declared constraint name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Constraint::PrimaryKey { name, .. }
            | Constraint::Unique { name, .. }
            | Constraint::Check { name, .. } => name.as_deref(),
            Constraint::ForeignKey(fk) => fk.name.as_deref(),
        }
    }

    /// Columns the constraint applies to.
    pub fn columns(&self) -> &[String] {
        match self {
            Constraint::PrimaryKey { columns, .. }
            | Constraint::Unique { columns, .. }
            | Constraint::Check { columns, .. } => columns,
            Constraint::ForeignKey(fk) => &fk.columns,
        }
    }

    /// SQL keyword for the constraint kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Constraint::PrimaryKey { .. } => "PRIMARY KEY",
            Constraint::ForeignKey(_) => "FOREIGN KEY",
            Constraint::Unique { .. } => "UNIQUE",
            Constraint::Check { .. } => "CHECK",
        }
    }
}

/// A foreign key whose referenced table exists in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Table declaring the foreign key.
    pub source_table: String,
    /// Referenced table.
    pub target_table: String,
    /// Referencing columns.
    pub source_columns: Vec<String>,
    /// Referenced columns, same length as `source_columns`.
    pub target_columns: Vec<String>,
}

/// A table with its columns, constraints, and resolved outgoing relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<Relationship>,
}

impl Table {
    /// An empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Table name as written (unquoted).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Constraints in declaration order (inline primary key first).
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Relationships resolved against the owning schema.
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Append a column. Names are unique per table, case-insensitively.
    pub fn add_column(&mut self, column: Column) -> Result<(), ModelError> {
        if self.find_column(&column.name).is_some() {
            return Err(ModelError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Append a constraint.
    ///
    /// Rejects a second primary key and foreign keys whose referenced column
    /// list is neither empty nor the same length as the referencing list.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), ModelError> {
        match &constraint {
            Constraint::PrimaryKey { .. } if self.has_primary_key() => {
                return Err(ModelError::DuplicatePrimaryKey {
                    table: self.name.clone(),
                });
            }
            Constraint::ForeignKey(fk)
                if !fk.referenced_columns.is_empty()
                    && fk.referenced_columns.len() != fk.columns.len() =>
            {
                return Err(ModelError::ForeignKeyArity {
                    table: self.name.clone(),
                    columns: fk.columns.len(),
                    referenced: fk.referenced_columns.len(),
                });
            }
            _ => {}
        }
        self.constraints.push(constraint);
        Ok(())
    }

    /// Column lookup by case-insensitive name.
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.has_name(name))
    }

    /// Declared primary key column names, if the table has a primary key.
    pub fn primary_key(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::PrimaryKey { columns, .. } => Some(columns.as_slice()),
            _ => None,
        })
    }

    /// Primary key columns that exist in the table, in key order.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key()
            .unwrap_or_default()
            .iter()
            .filter_map(|name| self.find_column(name))
            .collect()
    }

    /// Whether a primary key constraint is declared.
    pub fn has_primary_key(&self) -> bool {
        self.primary_key().is_some()
    }

    /// Whether `column` is part of the primary key.
    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.primary_key()
            .unwrap_or_default()
            .iter()
            .any(|c| same_identifier(c, column))
    }

    /// Foreign keys in declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::ForeignKey(fk) => Some(fk),
            _ => None,
        })
    }

    /// Unique constraints in declaration order.
    pub fn unique_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Unique { .. }))
    }

    /// Whether `column` participates in any foreign key.
    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_keys().any(|fk| fk.covers(column))
    }

    /// Columns outside the primary key, in declaration order.
    pub fn non_key_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !self.is_primary_key_column(&c.name))
            .collect()
    }
}

/// A named collection of tables with case-insensitive lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    name: String,
    tables: Vec<Table>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Schema {
    /// A schema without tables.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Assemble a schema from `tables` and resolve their relationships.
    pub fn from_tables(name: impl Into<String>, tables: Vec<Table>) -> Result<Self, ModelError> {
        let mut schema = Self::new(name);
        for table in tables {
            schema.add_table(table)?;
        }
        schema.resolve_relationships();
        Ok(schema)
    }

    /// Append a table. Table names are unique, case-insensitively.
    ///
    /// Relationships are not refreshed until [`Schema::resolve_relationships`].
    pub fn add_table(&mut self, table: Table) -> Result<(), ModelError> {
        let key = normalize_identifier(&table.name);
        if self.index.contains_key(&key) {
            return Err(ModelError::DuplicateTable { table: table.name });
        }
        self.index.insert(key, self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tables in declaration order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Table lookup by case-insensitive name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.index
            .get(&normalize_identifier(name))
            .map(|&idx| &self.tables[idx])
    }

    pub(crate) fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        let idx = *self.index.get(&normalize_identifier(name))?;
        self.tables.get_mut(idx)
    }

    /// Every resolved relationship, grouped by source table in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.tables.iter().flat_map(|t| t.relationships.iter())
    }

    /// Fill omitted referenced columns from the target's primary key and
    /// record a relationship for each foreign key whose target exists.
    pub fn resolve_relationships(&mut self) {
        let primary_keys: Vec<Vec<String>> = self
            .tables
            .iter()
            .map(|t| t.primary_key().unwrap_or_default().to_vec())
            .collect();
        let names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();

        for table in &mut self.tables {
            let source = table.name.clone();
            let mut relationships = Vec::new();
            for constraint in &mut table.constraints {
                let Constraint::ForeignKey(fk) = constraint else {
                    continue;
                };
                let Some(&target) = self.index.get(&normalize_identifier(&fk.referenced_table))
                else {
                    debug!(
                        table = %source,
                        referenced = %fk.referenced_table,
                        "foreign key target not in schema"
                    );
                    continue;
                };
                if fk.referenced_columns.is_empty() {
                    if primary_keys[target].len() != fk.columns.len() {
                        debug!(
                            table = %source,
                            referenced = %fk.referenced_table,
                            "cannot infer referenced columns from target primary key"
                        );
                        continue;
                    }
                    fk.referenced_columns = primary_keys[target].clone();
                }
                relationships.push(Relationship {
                    source_table: source.clone(),
                    target_table: names[target].clone(),
                    source_columns: fk.columns.clone(),
                    target_columns: fk.referenced_columns.clone(),
                });
            }
            table.relationships = relationships;
        }
    }
}
