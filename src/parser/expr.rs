use std::ops::ControlFlow;

use sqlparser::ast::{visit_expressions, Expr};

/// Extract a simple column name from an expression.
///
/// Supports plain identifiers (`price`) and qualified identifiers
/// (`products.price`), returning only the terminal column component.
pub fn extract_column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => Some(parts.last()?.value.clone()),
        Expr::Nested(inner) => extract_column_name(inner),
        Expr::Cast { expr, .. } => extract_column_name(expr),
        _ => None,
    }
}

/// Every column name mentioned anywhere inside `expr`, first mention first,
/// without repeats (compared case-insensitively).
pub fn referenced_column_names(expr: &Expr) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let _ = visit_expressions(expr, |node| {
        if matches!(node, Expr::Identifier(_) | Expr::CompoundIdentifier(_)) {
            if let Some(name) = extract_column_name(node) {
                if !names.iter().any(|seen| seen.eq_ignore_ascii_case(&name)) {
                    names.push(name);
                }
            }
        }
        ControlFlow::<()>::Continue(())
    });
    names
}
