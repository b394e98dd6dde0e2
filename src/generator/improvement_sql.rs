use crate::generator::fix_sql::comment_lines;
use crate::model::issue::NormalForm;
use crate::model::result::AnalysisResult;

/// Combine every issue's corrective SQL into one reviewable script.
///
/// Forms are emitted in order 1NF, 2NF, 3NF; empty forms and issues without
/// fix SQL are skipped.
pub fn generate_improvement_sql(result: &AnalysisResult) -> String {
    let mut sql = String::new();
    sql.push_str("-- SQL statements to improve schema normalization\n");
    sql.push_str(&format!(
        "-- Current normalization level: {}\n",
        result.achieved_form_label()
    ));

    for form in NormalForm::ALL {
        let issues = result.issues(form);
        if issues.is_empty() {
            continue;
        }
        sql.push_str(&format!("\n-- {form} issues\n"));
        let fixes = issues.iter().filter_map(|issue| {
            let fix = issue.fix_sql.as_deref()?.trim_end();
            (!fix.trim().is_empty()).then_some((issue, fix))
        });
        for (issue, fix) in fixes {
            sql.push('\n');
            let heading = format!("Issue on {}: {}", issue.table_name, issue.description);
            for line in comment_lines(&heading) {
                sql.push_str(&line);
                sql.push('\n');
            }
            sql.push_str(fix);
            sql.push('\n');
        }
    }
    sql
}
