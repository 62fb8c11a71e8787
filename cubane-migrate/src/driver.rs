//! The driver seam between the reconciler and a database vendor.
//!
//! [`SchemaDriver`] is the only way any part of the migrator talks to the
//! live database. The reference implementation targets PostgreSQL and
//! lives in `cubane-postgres`; a second vendor can be added behind this
//! trait without touching the reconciler, provided the engine supports
//! transactional DDL and the introspection surface below.

use std::collections::BTreeSet;

use async_trait::async_trait;
use cubane_catalogue::{FieldDef, FieldKind, ModelDef, Value};

use crate::error::MigrateResult;
use crate::naming;

/// A foreign-key constraint discovered on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referenced table.
    pub referenced_table: String,
    /// Referenced column.
    pub referenced_column: String,
}

/// The effective default of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// A literal value.
    Value(Value),
    /// The current timestamp at row-write time (`now()`).
    Now,
}

/// The effective default of a declared field: `auto_now` wins over any
/// declared literal.
pub fn effective_default(field: &FieldDef) -> Option<ColumnDefault> {
    if field.auto_now {
        Some(ColumnDefault::Now)
    } else {
        field.default.clone().map(ColumnDefault::Value)
    }
}

/// The sole adapter to the live database.
///
/// Introspection methods never mutate. Every mutation either succeeds or
/// returns an error that aborts the surrounding transaction; the caller
/// must then `rollback`. All mutations between `begin` and
/// `commit`/`rollback` form one atomic unit.
#[async_trait]
pub trait SchemaDriver: Send + Sync {
    // --- transaction control -------------------------------------------

    /// Put the connection in manual-commit mode and open a transaction
    /// subsuming all subsequent work.
    async fn begin(&self) -> MigrateResult<()>;

    /// Commit the open transaction.
    async fn commit(&self) -> MigrateResult<()>;

    /// Roll the open transaction back.
    async fn rollback(&self) -> MigrateResult<()>;

    /// Acquire exclusive locks on the named tables for the remainder of
    /// the transaction. Failure to acquire is a retryable error.
    async fn lock(&self, tables: &[String]) -> MigrateResult<()>;

    // --- introspection -------------------------------------------------

    /// All table names in the target schema.
    async fn get_table_names(&self) -> MigrateResult<BTreeSet<String>>;

    /// Whether a table exists.
    async fn table_exists(&self, table: &str) -> MigrateResult<bool>;

    /// Column names of a table in ordinal order.
    async fn get_column_names(&self, table: &str) -> MigrateResult<Vec<String>>;

    /// Whether a column exists.
    async fn column_exists(&self, table: &str, column: &str) -> MigrateResult<bool>;

    /// Whether a column accepts NULL.
    async fn column_is_nullable(&self, table: &str, column: &str) -> MigrateResult<bool>;

    /// The column's default expression as stored in the catalogue, if any.
    async fn get_column_default(&self, table: &str, column: &str)
    -> MigrateResult<Option<String>>;

    /// The column's data type in the vendor's normalized vocabulary, plus
    /// its character maximum length when bounded.
    async fn get_column_datatype(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<(String, Option<u32>)>;

    /// Names of all indices on a table.
    async fn get_indices(&self, table: &str) -> MigrateResult<BTreeSet<String>>;

    /// Whether an index with this name exists.
    async fn index_exists(&self, name: &str) -> MigrateResult<bool>;

    /// Whether the named index enforces uniqueness.
    async fn is_index_unique(&self, name: &str) -> MigrateResult<bool>;

    /// Whether a constraint with this name exists on the table.
    async fn constraint_exists(&self, table: &str, name: &str) -> MigrateResult<bool>;

    /// Whether a foreign-key constraint from `table.column` to
    /// `referenced_table.referenced_column` exists.
    async fn foreign_key_constraint_exists(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<bool>;

    /// All foreign-key constraints attached to a column.
    async fn foreign_keys_on(&self, table: &str, column: &str)
    -> MigrateResult<Vec<ForeignKey>>;

    /// Names of all non-internal triggers on a table.
    async fn get_triggers(&self, table: &str) -> MigrateResult<BTreeSet<String>>;

    /// Whether a trigger exists on a table.
    async fn trigger_exists(&self, table: &str, name: &str) -> MigrateResult<bool>;

    /// Whether a function with this name exists.
    async fn function_exists(&self, name: &str) -> MigrateResult<bool>;

    /// The source body of a function, if it exists.
    async fn function_source(&self, name: &str) -> MigrateResult<Option<String>>;

    /// Whether any row has NULL in the column.
    async fn has_null_value(&self, table: &str, column: &str) -> MigrateResult<bool>;

    /// Whether the table has no rows.
    async fn table_is_empty(&self, table: &str) -> MigrateResult<bool>;

    // --- mutation: tables ----------------------------------------------

    /// Create the table for a declared model: columns with nullability and
    /// defaults, and the primary key. Field indices and FK constraints are
    /// maintained separately so they get their deterministic names.
    async fn create_table(&self, model: &ModelDef) -> MigrateResult<()>;

    /// Rename a table.
    async fn rename_table(&self, old: &str, new: &str) -> MigrateResult<()>;

    /// Drop a table.
    async fn drop_table(&self, table: &str) -> MigrateResult<()>;

    // --- mutation: columns ---------------------------------------------

    /// Add a column for a declared field, including its nullability and
    /// default. Existing rows are backfilled from the default.
    async fn create_column(&self, table: &str, field: &FieldDef) -> MigrateResult<()>;

    /// Rename a column, preserving its data.
    async fn rename_column(&self, table: &str, old: &str, new: &str) -> MigrateResult<()>;

    /// Drop a column.
    async fn drop_column(&self, table: &str, column: &str) -> MigrateResult<()>;

    /// Change a column's data type, preserving existing data. Narrowing a
    /// varchar requires [`SchemaDriver::update_varchar_length`] first.
    async fn change_column_data_type(
        &self,
        table: &str,
        column: &str,
        kind: &FieldKind,
    ) -> MigrateResult<()>;

    /// Truncate all values in a varchar column to the given length.
    async fn update_varchar_length(
        &self,
        table: &str,
        column: &str,
        max_length: u32,
    ) -> MigrateResult<()>;

    /// Allow NULL in a column.
    async fn make_nullable(&self, table: &str, column: &str) -> MigrateResult<()>;

    /// Forbid NULL in a column. NULL rows must have been rewritten first.
    async fn make_not_nullable(&self, table: &str, column: &str) -> MigrateResult<()>;

    /// Set the column default.
    async fn set_column_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()>;

    /// Remove the column default.
    async fn drop_column_default(&self, table: &str, column: &str) -> MigrateResult<()>;

    /// Rewrite NULL rows to the given default.
    async fn update_null_to_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()>;

    // --- mutation: indices ---------------------------------------------

    /// Create a btree index (a unique constraint when `unique`) under the
    /// deterministic name for `(table, columns, unique)`.
    async fn create_index(
        &self,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> MigrateResult<()>;

    /// Create the prefix-match index for a textual column.
    async fn create_like_index(
        &self,
        table: &str,
        column: &str,
        kind: &FieldKind,
    ) -> MigrateResult<()>;

    /// Create the GIN index for a generated tsvector column.
    async fn create_fts_index(&self, table: &str, column: &str) -> MigrateResult<()>;

    /// Drop an index. Unique indices backed by a constraint drop the
    /// constraint instead.
    async fn drop_index(&self, table: &str, name: &str) -> MigrateResult<()>;

    /// Rename an index.
    async fn rename_index(&self, old: &str, new: &str) -> MigrateResult<()>;

    // --- mutation: constraints -----------------------------------------

    /// Add a foreign-key constraint from `table.column` to
    /// `referenced_table.referenced_column`.
    async fn create_foreign_key_constraint(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<()>;

    /// Drop a named foreign-key constraint.
    async fn drop_foreign_key_constraint(&self, table: &str, name: &str) -> MigrateResult<()>;

    // --- mutation: functions and triggers ------------------------------

    /// Create (or replace) a zero-argument function with the given return
    /// type and body.
    async fn create_function(&self, name: &str, returns: &str, body: &str)
    -> MigrateResult<()>;

    /// Drop a function by signature, e.g. `my_fn()`.
    async fn drop_function(&self, signature: &str) -> MigrateResult<()>;

    /// Install a `BEFORE INSERT OR UPDATE ... FOR EACH ROW` trigger
    /// executing the named function.
    async fn create_trigger(&self, table: &str, name: &str, function: &str)
    -> MigrateResult<()>;

    /// Drop a trigger from a table.
    async fn drop_trigger(&self, table: &str, name: &str) -> MigrateResult<()>;

    // --- full-text search ----------------------------------------------

    /// Rewrite the generated tsvector column for every row from its source
    /// columns.
    async fn fts_index(&self, table: &str, column: &str, sources: &[String])
    -> MigrateResult<()>;

    // --- collaborator escape hatch -------------------------------------

    /// Execute a raw statement on behalf of an external collaborator
    /// (content-type bookkeeping, fixtures). Returns affected rows.
    async fn execute_sql(&self, sql: &str) -> MigrateResult<u64>;

    // --- vendor mapping (pure) -----------------------------------------

    /// The vendor's normalized type name and bounded length for a field
    /// kind, in the same vocabulary
    /// [`SchemaDriver::get_column_datatype`] reports.
    fn expected_datatype(&self, kind: &FieldKind) -> (String, Option<u32>);

    // --- bookkeeping ---------------------------------------------------

    /// Number of mutating statements issued so far on this connection.
    fn statements_issued(&self) -> u64;

    // --- deterministic naming (shared by all vendors) ------------------

    /// The deterministic name for a btree/unique index.
    fn get_index_name(&self, table: &str, columns: &[&str], unique: bool) -> String {
        naming::index_name(table, columns, unique)
    }

    /// The deterministic name for a prefix-match index.
    fn get_like_index_name(&self, table: &str, column: &str) -> String {
        naming::like_index_name(table, column)
    }

    /// The deterministic name for an FTS GIN index.
    fn get_fts_index_name(&self, table: &str, column: &str) -> String {
        naming::fts_index_name(table, column)
    }

    // --- value quoting -------------------------------------------------

    /// Render a value as a SQL literal; `None` renders as `NULL`.
    fn q(&self, value: Option<&Value>) -> String {
        quote_value(value)
    }
}

/// Render a value as a SQL literal.
///
/// `None` is `NULL`, booleans `true`/`false`, numbers unlocalised, strings
/// single-quoted with embedded quotes doubled, dates and timestamps in ISO
/// form.
pub fn quote_value(value: Option<&Value>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Bool(false)) => "false".to_string(),
        Some(Value::Int(i)) => i.to_string(),
        Some(Value::Float(f)) => f.to_string(),
        Some(Value::Text(s)) => format!("'{}'", s.replace('\'', "''")),
        Some(Value::Date(d)) => format!("'{}'", d.format("%Y-%m-%d")),
        Some(Value::Time(t)) => format!("'{}'", t.format("%H:%M:%S")),
        Some(Value::Timestamp(ts)) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%:z")),
    }
}

/// Render the effective default as the literal used for comparison against
/// the live catalogue.
pub fn default_literal(default: Option<&ColumnDefault>) -> Option<String> {
    default.map(|d| match d {
        ColumnDefault::Now => "now()".to_string(),
        ColumnDefault::Value(v) => quote_value(Some(v)),
    })
}

/// Compare a live default expression with a freshly rendered one.
///
/// Live expressions carry vendor noise (`'x'::character varying`, wrapping
/// parentheses) that the comparison strips.
pub fn defaults_equal(live: Option<&str>, expected: Option<&str>) -> bool {
    match (live, expected) {
        (None, None) => true,
        (Some(l), Some(e)) => normalize_default(l) == normalize_default(e),
        _ => false,
    }
}

fn normalize_default(expr: &str) -> String {
    let mut expr = expr.trim();
    while expr.len() >= 2 && expr.starts_with('(') && expr.ends_with(')') {
        expr = expr[1..expr.len() - 1].trim();
    }
    let stripped = strip_cast(expr).trim();
    if stripped.contains('\'') {
        stripped.to_string()
    } else {
        stripped.to_ascii_lowercase()
    }
}

/// Cut a trailing `::type` cast, ignoring `::` inside string literals.
fn strip_cast(expr: &str) -> &str {
    let bytes = expr.as_bytes();
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b':' if !in_quote && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                return &expr[..i];
            }
            _ => {}
        }
        i += 1;
    }
    expr
}

/// Classification of a live-vs-declared type difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeChange {
    /// Types match; nothing to do.
    None,
    /// A safe widening; alter directly.
    Widen,
    /// A varchar narrowing; truncate values to the new length first.
    NarrowVarchar(u32),
    /// No automatic conversion; fatal.
    Unsupported,
}

/// Compare a live `(type, max_length)` pair with the declared one, both in
/// the driver's normalized vocabulary.
pub fn classify_type_change(
    live_type: &str,
    live_len: Option<u32>,
    want_type: &str,
    want_len: Option<u32>,
) -> TypeChange {
    if live_type == want_type && live_len == want_len {
        return TypeChange::None;
    }

    if live_type == want_type {
        if live_type == "character varying" {
            return match (live_len, want_len) {
                (Some(old), Some(new)) if new < old => TypeChange::NarrowVarchar(new),
                (None, Some(new)) => TypeChange::NarrowVarchar(new),
                _ => TypeChange::Widen,
            };
        }
        // Same base type with different parameters (e.g. numeric
        // precision); the ALTER preserves data or fails inside the
        // transaction.
        return TypeChange::Widen;
    }

    const WIDENINGS: &[(&str, &str)] = &[
        ("smallint", "integer"),
        ("smallint", "bigint"),
        ("integer", "bigint"),
        ("character varying", "text"),
        ("double precision", "numeric"),
    ];

    if WIDENINGS.contains(&(live_type, want_type)) {
        TypeChange::Widen
    } else {
        TypeChange::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value(None), "NULL");
        assert_eq!(quote_value(Some(&Value::Bool(true))), "true");
        assert_eq!(quote_value(Some(&Value::Int(-7))), "-7");
        assert_eq!(quote_value(Some(&Value::Float(0.5))), "0.5");
        assert_eq!(quote_value(Some(&Value::text("it's"))), "'it''s'");
        assert_eq!(
            quote_value(Some(&Value::Date(
                NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()
            ))),
            "'2020-01-31'"
        );
    }

    #[test]
    fn test_defaults_equal() {
        assert!(defaults_equal(None, None));
        assert!(!defaults_equal(Some("0"), None));
        assert!(!defaults_equal(None, Some("0")));

        assert!(defaults_equal(Some("0"), Some("0")));
        assert!(defaults_equal(Some("''::character varying"), Some("''")));
        assert!(defaults_equal(Some("'abc'::text"), Some("'abc'")));
        assert!(defaults_equal(Some("(-1)"), Some("-1")));
        assert!(defaults_equal(Some("now()"), Some("NOW()")));
        assert!(defaults_equal(Some("'2020-01-01'::date"), Some("'2020-01-01'")));

        // Quoted strings keep their case.
        assert!(!defaults_equal(Some("'ABC'"), Some("'abc'")));
        assert!(!defaults_equal(Some("'a'"), Some("'b'")));
    }

    #[test]
    fn test_classify_type_change_matrix() {
        // No change
        assert_eq!(
            classify_type_change("integer", None, "integer", None),
            TypeChange::None
        );
        assert_eq!(
            classify_type_change("character varying", Some(16), "character varying", Some(16)),
            TypeChange::None
        );

        // Widenings
        assert_eq!(
            classify_type_change("integer", None, "bigint", None),
            TypeChange::Widen
        );
        assert_eq!(
            classify_type_change("smallint", None, "integer", None),
            TypeChange::Widen
        );
        assert_eq!(
            classify_type_change("character varying", Some(16), "text", None),
            TypeChange::Widen
        );
        assert_eq!(
            classify_type_change("character varying", Some(16), "character varying", Some(32)),
            TypeChange::Widen
        );

        // Narrowing truncates first
        assert_eq!(
            classify_type_change("character varying", Some(32), "character varying", Some(16)),
            TypeChange::NarrowVarchar(16)
        );

        // Unsupported pairs
        assert_eq!(
            classify_type_change("text", None, "integer", None),
            TypeChange::Unsupported
        );
        assert_eq!(
            classify_type_change("bigint", None, "integer", None),
            TypeChange::Unsupported
        );
        assert_eq!(
            classify_type_change("boolean", None, "text", None),
            TypeChange::Unsupported
        );
    }

    #[test]
    fn test_effective_default_auto_now_wins() {
        let field = cubane_catalogue::FieldDef::new(
            "updated_on",
            cubane_catalogue::FieldKind::TimestampTz,
        )
        .default_value("ignored")
        .auto_now();

        assert_eq!(effective_default(&field), Some(ColumnDefault::Now));
        assert_eq!(
            default_literal(effective_default(&field).as_ref()),
            Some("now()".to_string())
        );
    }
}
