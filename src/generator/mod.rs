/// Per-issue corrective DDL fragments.
pub mod fix_sql;
/// The combined improvement script for an analysis result.
pub mod improvement_sql;
