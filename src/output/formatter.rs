use std::path::{Component, Path};

use crate::generator::improvement_sql::generate_improvement_sql;
use crate::model::result::AnalysisResult;
use crate::output::report;

/// Write the JSON analysis, the Markdown report, and the improvement SQL.
///
/// Files are named `<name>_analysis.json`, `<name>_report.md`, and
/// `<name>_improvement.sql`.
pub fn write_output(output_dir: &Path, name: &str, result: &AnalysisResult) -> Result<(), String> {
    validate_output_name(name)?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory: {e}"))?;

    // Write _analysis.json
    let analysis_path = output_dir.join(format!("{name}_analysis.json"));
    let analysis = serde_json::to_string_pretty(result)
        .map_err(|e| format!("Failed to serialize analysis: {e}"))?;
    std::fs::write(&analysis_path, analysis)
        .map_err(|e| format!("Failed to write {}: {e}", analysis_path.display()))?;

    // Write _report.md
    let report_path = output_dir.join(format!("{name}_report.md"));
    std::fs::write(&report_path, report::build_report(result))
        .map_err(|e| format!("Failed to write {}: {e}", report_path.display()))?;

    // Write _improvement.sql
    let sql_path = output_dir.join(format!("{name}_improvement.sql"));
    std::fs::write(&sql_path, generate_improvement_sql(result))
        .map_err(|e| format!("Failed to write {}: {e}", sql_path.display()))?;

    Ok(())
}

fn validate_output_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Output name must not be empty".to_string());
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(format!(
            "Invalid output name '{name}': absolute paths are not allowed"
        ));
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(format!(
            "Invalid output name '{name}': traversal segments are not allowed"
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!(
            "Invalid output name '{name}': path separators are not allowed"
        ));
    }
    Ok(())
}
