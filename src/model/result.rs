use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::issue::{Issue, NormalForm};
use crate::model::schema::Schema;
use crate::parser::schema_builder::ParseWarning;

/// Outcome of analysing one schema.
///
/// Issues are bucketed by the form they were reported against; every bucket
/// is present even when empty.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    schema: Schema,
    achieved_form: Option<NormalForm>,
    issues_by_form: BTreeMap<NormalForm, Vec<Issue>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ParseWarning>,
}

impl AnalysisResult {
    /// Assemble a result from the per-form issue lists.
    pub fn new(
        schema: Schema,
        achieved_form: Option<NormalForm>,
        first: Vec<Issue>,
        second: Vec<Issue>,
        third: Vec<Issue>,
        warnings: Vec<ParseWarning>,
    ) -> Self {
        let issues_by_form = BTreeMap::from([
            (NormalForm::First, first),
            (NormalForm::Second, second),
            (NormalForm::Third, third),
        ]);
        Self {
            schema,
            achieved_form,
            issues_by_form,
            warnings,
        }
    }

    /// The analysed schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Highest normal form reached; `None` when not even 1NF holds.
    pub fn achieved_form(&self) -> Option<NormalForm> {
        self.achieved_form
    }

    /// `1NF`/`2NF`/`3NF`, or `Not normalized`.
    pub fn achieved_form_label(&self) -> &'static str {
        self.achieved_form
            .map_or("Not normalized", NormalForm::label)
    }

    /// Issues reported against `form`.
    pub fn issues(&self, form: NormalForm) -> &[Issue] {
        self.issues_by_form
            .get(&form)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All buckets, keyed 1NF, 2NF, 3NF.
    pub fn issues_by_form(&self) -> &BTreeMap<NormalForm, Vec<Issue>> {
        &self.issues_by_form
    }

    /// Concatenation of the 1NF, 2NF, and 3NF buckets in that order.
    pub fn all_issues(&self) -> Vec<&Issue> {
        self.issues_by_form.values().flatten().collect()
    }

    /// Whether any bucket is non-empty.
    pub fn has_issues(&self) -> bool {
        self.issues_by_form.values().any(|issues| !issues.is_empty())
    }

    /// Statements the builder skipped or partially dropped.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::issue::IssueKind;

    fn issue(form: NormalForm, table: &str) -> Issue {
        Issue::new(form, IssueKind::PartialDependency, table, "d")
    }

    #[test]
    fn all_issues_concatenates_buckets_in_form_order() {
        let schema = Schema::new("s");
        let result = AnalysisResult::new(
            schema,
            None,
            vec![issue(NormalForm::First, "a")],
            Vec::new(),
            vec![issue(NormalForm::Third, "b"), issue(NormalForm::Third, "c")],
            Vec::new(),
        );

        let tables: Vec<&str> = result
            .all_issues()
            .iter()
            .map(|i| i.table_name.as_str())
            .collect();
        assert_eq!(tables, vec!["a", "b", "c"]);
        assert!(result.has_issues());
        assert!(result.issues(NormalForm::Second).is_empty());
        assert_eq!(result.issues_by_form().len(), 3);
        assert_eq!(result.achieved_form_label(), "Not normalized");
    }

    #[test]
    fn empty_result_has_no_issues() {
        let schema = Schema::new("s");
        let result = AnalysisResult::new(
            schema,
            Some(NormalForm::Third),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert!(!result.has_issues());
        assert!(result.all_issues().is_empty());
        assert_eq!(result.achieved_form_label(), "3NF");
    }
}
