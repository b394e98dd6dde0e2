/// Writes the analysis JSON, report, and improvement SQL to disk.
pub mod formatter;
/// Builds a Markdown report from an analysis result.
pub mod report;
