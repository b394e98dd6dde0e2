use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three normal forms evaluated by the analyzers, ordered 1NF < 2NF < 3NF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NormalForm {
    /// First normal form: atomic values, a primary key, no repeating groups.
    #[serde(rename = "1NF")]
    First,
    /// Second normal form: no partial dependency on a composite key.
    #[serde(rename = "2NF")]
    Second,
    /// Third normal form: no transitive dependency through non-key columns.
    #[serde(rename = "3NF")]
    Third,
}

impl NormalForm {
    /// All forms in ascending order.
    pub const ALL: [NormalForm; 3] = [NormalForm::First, NormalForm::Second, NormalForm::Third];

    /// Short label: `1NF`, `2NF`, `3NF`.
    pub fn label(self) -> &'static str {
        match self {
            NormalForm::First => "1NF",
            NormalForm::Second => "2NF",
            NormalForm::Third => "3NF",
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NormalForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1nf" | "1" | "first" => Ok(NormalForm::First),
            "2nf" | "2" | "second" => Ok(NormalForm::Second),
            "3nf" | "3" | "third" => Ok(NormalForm::Third),
            _ => Err(format!(
                "invalid normal form '{s}', expected one of: 1NF, 2NF, 3NF"
            )),
        }
    }
}

/// What an [`Issue`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The table declares no primary key.
    MissingPrimaryKey,
    /// A column's type stores several values (`SET`, `ENUM`, `JSON`, arrays).
    MultiValuedColumn,
    /// Advisory: a free-text or binary column may hide structured content.
    StructuredData,
    /// Numbered columns (`phone1`, `phone2`, ...) form a repeating group.
    RepeatingGroup,
    /// Columns depend on part of the key rather than the whole key.
    PartialDependency,
    /// Columns depend on a non-key column rather than on the key.
    TransitiveDependency,
    /// Address parts stored inline without a dedicated address entity.
    AddressDenormalization,
    /// Advisory: a column looks derivable from other columns.
    CalculatedField,
}

impl IssueKind {
    /// Human-readable name used in reports.
    pub fn title(self) -> &'static str {
        match self {
            IssueKind::MissingPrimaryKey => "Missing primary key",
            IssueKind::MultiValuedColumn => "Multi-valued column",
            IssueKind::StructuredData => "Possible structured data",
            IssueKind::RepeatingGroup => "Repeating group",
            IssueKind::PartialDependency => "Partial dependency",
            IssueKind::TransitiveDependency => "Transitive dependency",
            IssueKind::AddressDenormalization => "Address denormalization",
            IssueKind::CalculatedField => "Calculated field",
        }
    }
}

/// One finding: a normal-form violation or an advisory warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Normal form the finding is reported against.
    pub violated_form: NormalForm,
    /// Category of the finding.
    pub kind: IssueKind,
    /// Table the finding is about.
    pub table_name: String,
    /// Single column name, or several joined by `", "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    /// What was detected.
    pub description: String,
    /// How to address it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Corrective SQL, when one can be generated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_sql: Option<String>,
}

impl Issue {
    /// An issue without column, suggestion, or fix.
    pub fn new(
        violated_form: NormalForm,
        kind: IssueKind,
        table_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            violated_form,
            kind,
            table_name: table_name.into(),
            column_name: None,
            description: description.into(),
            suggestion: None,
            fix_sql: None,
        }
    }

    /// Attach one column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    /// Attach several columns, joined by `", "`.
    pub fn with_columns<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        let joined = columns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        self.column_name = Some(joined);
        self
    }

    /// Attach a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach corrective SQL.
    pub fn with_fix_sql(mut self, fix_sql: impl Into<String>) -> Self {
        self.fix_sql = Some(fix_sql.into());
        self
    }

    /// Columns named by the issue, split back out of `column_name`.
    pub fn columns(&self) -> Vec<&str> {
        self.column_name
            .as_deref()
            .map(|names| {
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether non-blank corrective SQL is attached.
    pub fn has_fix_sql(&self) -> bool {
        self.fix_sql.as_deref().is_some_and(|sql| !sql.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_forms_order_and_parse() {
        assert!(NormalForm::First < NormalForm::Second);
        assert!(NormalForm::Second < NormalForm::Third);
        assert_eq!("2nf".parse::<NormalForm>(), Ok(NormalForm::Second));
        assert_eq!("3".parse::<NormalForm>(), Ok(NormalForm::Third));
        assert!("4NF".parse::<NormalForm>().is_err());
        assert_eq!(NormalForm::First.to_string(), "1NF");
        assert_eq!(
            serde_json::to_string(&NormalForm::Third).unwrap(),
            "\"3NF\""
        );
    }

    #[test]
    fn issue_columns_split_joined_names() {
        let issue = Issue::new(
            NormalForm::First,
            IssueKind::RepeatingGroup,
            "students",
            "Potential repeating group detected: course columns",
        )
        .with_columns(&["course1", "course2", "course3"]);
        assert_eq!(issue.column_name.as_deref(), Some("course1, course2, course3"));
        assert_eq!(issue.columns(), vec!["course1", "course2", "course3"]);
        assert!(!issue.has_fix_sql());
        assert!(!issue.with_fix_sql("  \n").has_fix_sql());
    }
}
