mod support;

use schema_normalizer::model::{IssueKind, NormalForm};
use support::analyze_fixture;

#[test]
fn numbered_course_columns_block_first_normal_form() {
    let result = analyze_fixture("students");

    assert_eq!(result.achieved_form(), None);
    assert_eq!(result.achieved_form_label(), "Not normalized");

    let first = result.issues(NormalForm::First);
    let group = first
        .iter()
        .find(|issue| issue.kind == IssueKind::RepeatingGroup)
        .unwrap_or_else(|| panic!("expected a repeating group issue, got {first:?}"));
    assert_eq!(group.table_name, "students");
    assert_eq!(group.column_name.as_deref(), Some("course1, course2, course3"));
    assert!(group.description.contains("course"));
    assert!(result.issues(NormalForm::Second).is_empty());
    assert!(result.issues(NormalForm::Third).is_empty());
}

#[test]
fn product_name_depends_on_part_of_composite_key() {
    let result = analyze_fixture("order_items");

    assert_eq!(result.achieved_form(), Some(NormalForm::First));
    assert!(result.issues(NormalForm::First).is_empty());

    let second = result.issues(NormalForm::Second);
    assert_eq!(second.len(), 2, "unexpected 2NF issues: {second:?}");
    assert!(second.iter().all(|issue| {
        issue.kind == IssueKind::PartialDependency
            && issue
                .column_name
                .as_deref()
                .is_some_and(|c| c.contains("product_name"))
    }));
    assert!(second[0]
        .description
        .contains("these columns may depend on product_id"));
    assert!(second[1]
        .description
        .contains("this column may depend on product_id"));
    assert!(result.issues(NormalForm::Third).is_empty());
}

#[test]
fn department_name_depends_on_department_id() {
    let result = analyze_fixture("employees");

    assert_eq!(result.achieved_form(), Some(NormalForm::Second));
    assert!(result.issues(NormalForm::First).is_empty());
    assert!(result.issues(NormalForm::Second).is_empty());

    let third = result.issues(NormalForm::Third);
    assert_eq!(third.len(), 1, "duplicates should collapse, got {third:?}");
    assert_eq!(third[0].kind, IssueKind::TransitiveDependency);
    assert_eq!(third[0].column_name.as_deref(), Some("department_name"));
    assert!(third[0].description.contains("department_id"));
}

#[test]
fn normalized_company_reaches_third_normal_form() {
    let result = analyze_fixture("normalized_company");

    assert_eq!(result.schema().tables().len(), 5);
    assert_eq!(result.achieved_form(), Some(NormalForm::Third));
    for form in NormalForm::ALL {
        assert!(
            result.issues(form).is_empty(),
            "expected no {form} issues, got {:?}",
            result.issues(form)
        );
    }
    assert!(!result.has_issues());
    assert!(result.warnings().is_empty());
}
