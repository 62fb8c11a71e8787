//! Deterministic index, trigger and function naming.
//!
//! Every index the migrator creates is named as a pure function of
//! `(table, columns, unique)`. The deprecated-index sweep relies on this:
//! an index whose name matches one of the patterns here is "owned" by the
//! migrator and safe to drop once no declared field accounts for it;
//! anything else is assumed to belong to the user and is left alone.

use std::collections::HashSet;

/// Prefix of all full-text-search artefacts (indices, triggers, functions).
pub const FTS_PREFIX: &str = "cubane_fts_";

/// Name of the btree index on `columns`, `_key`-suffixed when unique.
pub fn index_name(table: &str, columns: &[&str], unique: bool) -> String {
    let mut name = format!("{}_{}", table, columns.join("_"));
    if unique {
        name.push_str("_key");
    }
    name
}

/// Name of the prefix-match (`LIKE 'x%'`) index on a text column.
pub fn like_index_name(table: &str, column: &str) -> String {
    format!("{}_{}_like", table, column)
}

/// Name of the GIN index on a generated tsvector column.
pub fn fts_index_name(table: &str, column: &str) -> String {
    format!("{}{}_{}", FTS_PREFIX, table, column)
}

/// Name of the trigger maintaining a generated tsvector column.
pub fn fts_trigger_name(table: &str, column: &str) -> String {
    format!("{}{}_{}_trigger", FTS_PREFIX, table, column)
}

/// Name of the trigger function maintaining a generated tsvector column.
pub fn fts_function_name(table: &str, column: &str) -> String {
    format!("{}{}_{}_update", FTS_PREFIX, table, column)
}

/// Whether `name` is an index the migrator owns on `table`.
///
/// Owned names are `<table>_<columns...>` optionally suffixed `_key` or
/// `_like`, where the column part resolves to a `_`-joined sequence of
/// known column names, or anything under the `cubane_fts_<table>_` prefix.
/// Primary-key indices (`_pkey`) are never owned.
pub fn is_owned_index(table: &str, name: &str, columns: &HashSet<String>) -> bool {
    if name.starts_with(&format!("{}{}_", FTS_PREFIX, table)) {
        return true;
    }
    if name.ends_with("_pkey") {
        return false;
    }
    let Some(rest) = name.strip_prefix(&format!("{}_", table)) else {
        return false;
    };
    let rest = rest
        .strip_suffix("_key")
        .or_else(|| rest.strip_suffix("_like"))
        .unwrap_or(rest);
    is_column_sequence(rest, columns)
}

/// The name an owned index moves to when its table is renamed, or `None`
/// when the index is not owned by the old table.
pub fn renamed_index_name(
    name: &str,
    old_table: &str,
    new_table: &str,
    columns: &HashSet<String>,
) -> Option<String> {
    if !is_owned_index(old_table, name, columns) {
        return None;
    }
    let fts_prefix = format!("{}{}_", FTS_PREFIX, old_table);
    if let Some(rest) = name.strip_prefix(&fts_prefix) {
        return Some(format!("{}{}_{}", FTS_PREFIX, new_table, rest));
    }
    name.strip_prefix(&format!("{}_", old_table))
        .map(|rest| format!("{}_{}", new_table, rest))
}

/// Whether `rest` parses as one or more known column names joined by `_`.
///
/// Column names may themselves contain underscores, so the match tries
/// every split point.
fn is_column_sequence(rest: &str, columns: &HashSet<String>) -> bool {
    if columns.contains(rest) {
        return true;
    }
    for (i, _) in rest.match_indices('_') {
        if columns.contains(&rest[..i]) && is_column_sequence(&rest[i + 1..], columns) {
            return true;
        }
    }
    false
}
