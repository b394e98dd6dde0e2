use crate::model::issue::{Issue, IssueKind, NormalForm};
use crate::model::schema::Schema;

/// Atomic values, primary keys, and repeating groups.
pub mod first_normal_form;
/// Column-name and column-type heuristics.
pub mod naming;
/// Runs the analyzers in order and assembles the [`AnalysisResult`](crate::model::AnalysisResult).
pub mod normalizer;
/// Partial dependencies on composite keys.
pub mod second_normal_form;
/// Transitive dependencies through non-key columns.
pub mod third_normal_form;

pub use first_normal_form::FirstNormalForm;
pub use second_normal_form::SecondNormalForm;
pub use third_normal_form::ThirdNormalForm;

/// A normal-form check over a whole schema.
pub trait NormalFormAnalyzer {
    /// Form this analyzer evaluates.
    fn form(&self) -> NormalForm;

    /// Findings in table declaration order.
    ///
    /// Gated analyzers return the findings of the form that blocked them.
    fn analyze(&self, schema: &Schema) -> Vec<Issue>;

    /// Whether the schema produced no findings at all.
    fn is_compliant(&self, schema: &Schema) -> bool {
        self.analyze(schema).is_empty()
    }
}

/// Whether a 1NF finding stops the higher forms from being evaluated.
///
/// Structured-data warnings never block. Neither does a repeating group of at
/// most two columns that all mention `id` (for example `parent1_id`, `parent2_id`).
///
/// This is the only gate: [`SecondNormalForm`] and the
/// [`Normalizer`](normalizer::Normalizer) both call it. An identifier pair
/// therefore lets 2NF and 3NF run, and a schema whose only 1NF finding is such
/// a pair can be reported as 3NF rather than stopping at 1NF.
pub fn is_blocking(issue: &Issue) -> bool {
    match issue.kind {
        IssueKind::StructuredData => false,
        IssueKind::RepeatingGroup => !is_identifier_pair(issue),
        _ => true,
    }
}

fn is_identifier_pair(issue: &Issue) -> bool {
    let columns = issue.columns();
    !columns.is_empty()
        && columns.len() <= 2
        && columns
            .iter()
            .all(|c| c.to_ascii_lowercase().contains("id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeating_group(columns: &[&str]) -> Issue {
        Issue::new(NormalForm::First, IssueKind::RepeatingGroup, "t", "d").with_columns(columns)
    }

    #[test]
    fn structured_data_warnings_never_block() {
        let issue = Issue::new(NormalForm::First, IssueKind::StructuredData, "t", "d");
        assert!(!is_blocking(&issue));
    }

    #[test]
    fn identifier_pairs_do_not_block() {
        assert!(!is_blocking(&repeating_group(&["parent1_id", "parent2_id"])));
        assert!(is_blocking(&repeating_group(&["phone1", "phone2"])));
        assert!(is_blocking(&repeating_group(&["ref1_id", "ref2_id", "ref3_id"])));
    }

    #[test]
    fn missing_keys_and_multi_valued_columns_block() {
        for kind in [IssueKind::MissingPrimaryKey, IssueKind::MultiValuedColumn] {
            assert!(is_blocking(&Issue::new(NormalForm::First, kind, "t", "d")));
        }
    }
}
