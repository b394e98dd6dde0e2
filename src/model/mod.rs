/// Normal forms, issue kinds, and the issue record produced by analyzers.
pub mod issue;
/// Aggregated outcome of one analysis run.
pub mod result;
/// Tables, columns, constraints, and resolved relationships.
pub mod schema;

pub use issue::{Issue, IssueKind, NormalForm};
pub use result::AnalysisResult;
pub use schema::{Column, Constraint, ForeignKey, Relationship, Schema, Table};
