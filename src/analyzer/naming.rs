//! Column-name and column-type heuristics shared by the analyzers.
//!
//! Every comparison is case-insensitive. Helpers returning a base name return
//! it lowercased.

use crate::model::schema::{Column, ForeignKey};
use crate::parser::names::normalize_identifier;

/// Suffixes marking a column as an identifier of some entity.
pub const IDENTIFIER_SUFFIXES: [&str; 4] = ["_id", "_code", "_key", "_no"];

/// Suffixes marking a column as an attribute of some entity.
pub const ATTRIBUTE_SUFFIXES: [&str; 14] = [
    "_name",
    "_description",
    "_address",
    "_city",
    "_state",
    "_zip",
    "_country",
    "_date",
    "_time",
    "_price",
    "_cost",
    "_quantity",
    "_amount",
    "_total",
];

const MULTI_VALUED_TYPE_MARKERS: [&str; 4] = ["SET", "ENUM", "JSON", "ARRAY"];
const TEXT_NAME_ALLOW_LIST: [&str; 6] =
    ["content", "description", "bio", "comment", "note", "article"];
const BINARY_NAME_ALLOW_LIST: [&str; 5] = ["image", "photo", "thumbnail", "file", "attachment"];
const DESCRIPTIVE_SUFFIXES: [&str; 4] = ["_name", "_desc", "_description", "_title"];
const ADDRESS_NAMES: [&str; 5] = ["city", "state", "zip", "postal_code", "country"];
const MONETARY_TOKENS: [&str; 6] = ["price", "cost", "amount", "total", "tax", "discount"];
const DERIVED_TOKENS: [&str; 6] = ["total", "subtotal", "net", "gross", "final", "discounted"];

/// Whether the declared type holds several values per row.
pub fn is_multi_valued_type(data_type: &str) -> bool {
    let upper = data_type.to_ascii_uppercase();
    MULTI_VALUED_TYPE_MARKERS
        .iter()
        .any(|marker| upper.contains(marker))
}

/// Whether a free-text or binary column may be hiding structured content.
///
/// Columns whose name says what the payload is (`bio`, `photo`, ...) are
/// expected to hold opaque values and are not flagged.
pub fn might_hold_structured_data(column: &Column) -> bool {
    let data_type = column.data_type.to_ascii_uppercase();
    let name = column.name.to_ascii_lowercase();

    if data_type.contains("TEXT") {
        return !TEXT_NAME_ALLOW_LIST.iter().any(|token| name.contains(token));
    }
    if data_type.contains("BLOB") {
        return !BINARY_NAME_ALLOW_LIST
            .iter()
            .any(|token| name.contains(token));
    }
    data_type.contains("JSON") || (data_type.contains("VARCHAR") && data_type.contains("MAX"))
}

/// Value type for a child table holding the elements of a multi-valued column.
pub fn element_type_for(data_type: &str) -> &'static str {
    let upper = data_type.to_ascii_uppercase();
    if upper.contains("VARCHAR") {
        "VARCHAR(255)"
    } else if upper.contains("INT") {
        "INT"
    } else {
        "TEXT"
    }
}

/// `name` without trailing ASCII digits.
pub fn strip_trailing_digits(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Whether `name` is `base` followed by one or more digits.
pub fn is_numbered_variant(name: &str, base: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.strip_prefix(&base.to_ascii_lowercase())
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// The identifier suffix `name` ends with, if any.
pub fn identifier_suffix(name: &str) -> Option<&'static str> {
    let lower = name.to_ascii_lowercase();
    IDENTIFIER_SUFFIXES
        .into_iter()
        .find(|suffix| lower.ends_with(suffix))
}

/// Whether `name` ends with one of [`IDENTIFIER_SUFFIXES`].
pub fn has_identifier_suffix(name: &str) -> bool {
    identifier_suffix(name).is_some()
}

/// Lowercased `name` with its identifier suffix removed, if it has one.
pub fn identifier_base(name: &str) -> Option<String> {
    let suffix = identifier_suffix(name)?;
    let lower = name.to_ascii_lowercase();
    Some(lower[..lower.len() - suffix.len()].to_string())
}

/// Lowercased `name` with a trailing `_id` removed.
pub fn strip_id_suffix(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.strip_suffix("_id") {
        Some(base) => base.to_string(),
        None => lower,
    }
}

/// Entity a column appears to describe, e.g. `department` for both
/// `department_id` and `department_name`.
///
/// Tries identifier suffixes, then attribute suffixes, then the prefix up to
/// the first underscore.
pub fn entity_base(name: &str) -> Option<String> {
    let lower = name.to_ascii_lowercase();
    if let Some(base) = identifier_base(&lower) {
        return Some(base);
    }
    if let Some(suffix) = ATTRIBUTE_SUFFIXES
        .into_iter()
        .find(|suffix| lower.ends_with(suffix))
    {
        return Some(lower[..lower.len() - suffix.len()].to_string());
    }
    match lower.find('_') {
        Some(idx) if idx > 0 => Some(lower[..idx].to_string()),
        _ => None,
    }
}

/// Whether the column name reads as a label (`_name`, `_title`, ...).
pub fn is_descriptive_column(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DESCRIPTIVE_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Whether the column looks like part of a postal address.
pub fn is_address_column(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("address")
        || lower.contains("street")
        || ADDRESS_NAMES.contains(&lower.as_str())
}

/// Whether the column looks like a money amount.
pub fn is_monetary_column(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    MONETARY_TOKENS.iter().any(|token| lower.contains(token))
}

/// Whether the column name suggests a value derived from other columns.
pub fn is_derived_value_column(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    DERIVED_TOKENS.iter().any(|token| lower.contains(token))
}

/// Whether a column name appears to describe the table a foreign key points at.
///
/// True when the name contains the referenced table name, starts with its
/// first three characters, or (single-column keys only) starts with the key
/// column's `_id`-stripped name followed by `_`.
pub fn relates_to_referenced_table(column: &str, fk: &ForeignKey) -> bool {
    let column = column.to_ascii_lowercase();
    let referenced = normalize_identifier(&fk.referenced_table);
    if referenced.is_empty() {
        return false;
    }

    let prefix: String = referenced.chars().take(3).collect();
    if column.contains(&referenced) || column.starts_with(&prefix) {
        return true;
    }
    match fk.columns.as_slice() {
        [single] => column.starts_with(&format!("{}_", strip_id_suffix(single))),
        _ => false,
    }
}
