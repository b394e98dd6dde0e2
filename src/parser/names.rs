use std::borrow::Cow;

/// Return the identifier without surrounding quotes.
///
/// Accepts ANSI double quotes, MySQL backticks, and SQL Server brackets.
pub fn unquote_identifier(ident: &str) -> &str {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| ident.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .or_else(|| ident.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
        .unwrap_or(ident)
}

/// Render a name for generated SQL.
///
/// Plain identifiers are returned as-is. Anything else is double-quoted with
/// embedded quotes doubled, and line breaks become spaces so the identifier
/// never spans lines.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        return Cow::Borrowed(name);
    }
    let escaped: String = name
        .chars()
        .map(|c| if matches!(c, '\r' | '\n') { ' ' } else { c })
        .collect::<String>()
        .replace('"', "\"\"");
    Cow::Owned(format!("\"{escaped}\""))
}

/// Normalize an identifier for case-insensitive matching.
///
/// Trims whitespace, removes surrounding quotes on a single identifier,
/// and lowercases the result.
pub fn normalize_identifier(ident: &str) -> String {
    unquote_identifier(ident.trim()).to_ascii_lowercase()
}

/// Case-insensitive identifier equality, ignoring surrounding quotes.
pub fn same_identifier(left: &str, right: &str) -> bool {
    unquote_identifier(left.trim()).eq_ignore_ascii_case(unquote_identifier(right.trim()))
}

/// Split a potentially schema-qualified name into `(schema, relation)`.
///
/// Handles dots inside quoted identifiers, e.g. `"my.schema"."table.name"`.
pub fn split_schema_and_relation(name: &str) -> Option<(String, String)> {
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    let mut parts: Vec<&str> = Vec::new();

    for (idx, ch) in name.char_indices() {
        match (quote, ch) {
            (None, '"' | '`') => quote = Some(ch),
            (None, '[') => quote = Some(']'),
            (Some(close), _) if ch == close => quote = None,
            (None, '.') => {
                parts.push(name[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(name[start..].trim());

    if parts.len() < 2 {
        return None;
    }

    let schema = unquote_identifier(parts[parts.len() - 2]).to_string();
    let relation = unquote_identifier(parts[parts.len() - 1]).to_string();
    Some((schema, relation))
}

/// Reduce an object name to its terminal relation, unquoted, case preserved.
///
/// Examples:
/// - `"public.docs"` -> `"docs"`
/// - `"\"Sales\".\"Order Items\""` -> `"Order Items"`
/// - `"employees"` -> `"employees"`
pub fn relation_name(name: &str) -> String {
    if let Some((_, relation)) = split_schema_and_relation(name.trim()) {
        return relation;
    }
    unquote_identifier(name.trim()).to_string()
}

/// Extract a bare column name from a rendered key column.
///
/// Key columns may render with an ordering suffix (`"order_id DESC"`); only
/// the identifier is kept.
pub fn key_column_name(rendered: &str) -> String {
    let rendered = rendered.trim();
    let close = match rendered.chars().next() {
        Some('"') => '"',
        Some('`') => '`',
        Some('[') => ']',
        _ => return rendered.split_whitespace().next().unwrap_or_default().to_string(),
    };
    match rendered[1..].find(close) {
        Some(end) => rendered[1..=end].to_string(),
        None => rendered.to_string(),
    }
}
