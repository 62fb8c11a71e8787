//! SQL statement generation for PostgreSQL.
//!
//! All DDL/DML text the driver issues is built here, as pure functions, so
//! the exact statements are unit-testable without a server. Identifiers
//! are always double-quoted; values go through the migrator's literal
//! quoting.

use cubane_catalogue::{FieldDef, FieldKind, ModelDef};
use cubane_migrate::{ColumnDefault, quote_value};

/// Double-quote an identifier.
pub fn ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The DDL type for a field kind.
pub fn sql_type(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Int => "INTEGER".to_string(),
        FieldKind::BigInt => "BIGINT".to_string(),
        FieldKind::SmallInt => "SMALLINT".to_string(),
        FieldKind::Float => "DOUBLE PRECISION".to_string(),
        FieldKind::Decimal { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
        FieldKind::Text => "TEXT".to_string(),
        FieldKind::Varchar { max_length } => format!("VARCHAR({})", max_length),
        FieldKind::Bool => "BOOLEAN".to_string(),
        FieldKind::Date => "DATE".to_string(),
        FieldKind::Time => "TIME".to_string(),
        FieldKind::TimestampTz => "TIMESTAMP WITH TIME ZONE".to_string(),
        FieldKind::ForeignKey { .. } => "INTEGER".to_string(),
        FieldKind::TsVector => "TSVECTOR".to_string(),
    }
}

/// The normalized `(type, max_length)` pair for a field kind, in the
/// vocabulary `information_schema.columns` reports.
pub fn normalized_type(kind: &FieldKind) -> (String, Option<u32>) {
    match kind {
        FieldKind::Int | FieldKind::ForeignKey { .. } => ("integer".to_string(), None),
        FieldKind::BigInt => ("bigint".to_string(), None),
        FieldKind::SmallInt => ("smallint".to_string(), None),
        FieldKind::Float => ("double precision".to_string(), None),
        FieldKind::Decimal { .. } => ("numeric".to_string(), None),
        FieldKind::Text => ("text".to_string(), None),
        FieldKind::Varchar { max_length } => {
            ("character varying".to_string(), Some(*max_length))
        }
        FieldKind::Bool => ("boolean".to_string(), None),
        FieldKind::Date => ("date".to_string(), None),
        FieldKind::Time => ("time without time zone".to_string(), None),
        FieldKind::TimestampTz => ("timestamp with time zone".to_string(), None),
        FieldKind::TsVector => ("tsvector".to_string(), None),
    }
}

/// Render a column default expression.
pub fn render_default(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Now => "now()".to_string(),
        ColumnDefault::Value(v) => quote_value(Some(v)),
    }
}

/// Generate a column definition for CREATE TABLE / ADD COLUMN.
///
/// Unique constraints and field indices are not part of the definition;
/// the reconciler maintains those separately under deterministic names.
pub fn column_definition(field: &FieldDef) -> String {
    let mut parts = vec![ident(field.column_name())];

    if field.auto_increment {
        parts.push(match field.kind {
            FieldKind::BigInt => "BIGSERIAL".to_string(),
            _ => "SERIAL".to_string(),
        });
    } else {
        parts.push(sql_type(&field.kind));
    }

    if !field.nullable && !field.primary_key {
        parts.push("NOT NULL".to_string());
    }

    let effective = if field.auto_now {
        Some(ColumnDefault::Now)
    } else {
        field.default.clone().map(ColumnDefault::Value)
    };
    if let Some(default) = effective
        && !field.auto_increment
    {
        parts.push(format!("DEFAULT {}", render_default(&default)));
    }

    parts.join(" ")
}

/// Generate a CREATE TABLE statement.
pub fn create_table(model: &ModelDef) -> String {
    let mut columns: Vec<String> = model.fields.iter().map(column_definition).collect();

    let pk: Vec<String> = model
        .fields
        .iter()
        .filter(|f| f.primary_key)
        .map(|f| ident(f.column_name()))
        .collect();
    if !pk.is_empty() {
        columns.push(format!("PRIMARY KEY ({})", pk.join(", ")));
    }

    format!(
        "CREATE TABLE {} (\n    {}\n)",
        ident(&model.table),
        columns.join(",\n    ")
    )
}

/// Generate an ALTER TABLE RENAME statement.
pub fn rename_table(old: &str, new: &str) -> String {
    format!("ALTER TABLE {} RENAME TO {}", ident(old), ident(new))
}

/// Generate a DROP TABLE statement.
pub fn drop_table(table: &str) -> String {
    format!("DROP TABLE {}", ident(table))
}

/// Generate an ADD COLUMN statement.
pub fn add_column(table: &str, field: &FieldDef) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        ident(table),
        column_definition(field)
    )
}

/// Generate a RENAME COLUMN statement.
pub fn rename_column(table: &str, old: &str, new: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME COLUMN {} TO {}",
        ident(table),
        ident(old),
        ident(new)
    )
}

/// Generate a DROP COLUMN statement.
pub fn drop_column(table: &str, column: &str) -> String {
    format!("ALTER TABLE {} DROP COLUMN {}", ident(table), ident(column))
}

/// Generate an ALTER COLUMN TYPE statement, casting existing data.
pub fn change_column_type(table: &str, column: &str, kind: &FieldKind) -> String {
    let ty = sql_type(kind);
    format!(
        "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{}",
        ident(table),
        ident(column),
        ty,
        ident(column),
        ty
    )
}

/// Truncate over-length values ahead of a varchar narrowing.
pub fn update_varchar_length(table: &str, column: &str, max_length: u32) -> String {
    format!(
        "UPDATE {t} SET {c} = left({c}, {n}) WHERE char_length({c}) > {n}",
        t = ident(table),
        c = ident(column),
        n = max_length
    )
}

/// Generate DROP NOT NULL.
pub fn make_nullable(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL",
        ident(table),
        ident(column)
    )
}

/// Generate SET NOT NULL.
pub fn make_not_nullable(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
        ident(table),
        ident(column)
    )
}

/// Generate SET DEFAULT.
pub fn set_default(table: &str, column: &str, default: &ColumnDefault) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
        ident(table),
        ident(column),
        render_default(default)
    )
}

/// Generate DROP DEFAULT.
pub fn drop_default(table: &str, column: &str) -> String {
    format!(
        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
        ident(table),
        ident(column)
    )
}

/// Rewrite NULL rows to a default ahead of SET NOT NULL.
pub fn update_null_to_default(table: &str, column: &str, default: &ColumnDefault) -> String {
    format!(
        "UPDATE {t} SET {c} = {v} WHERE {c} IS NULL",
        t = ident(table),
        c = ident(column),
        v = render_default(default)
    )
}

/// Generate a CREATE INDEX statement for a non-unique btree index.
pub fn create_index(table: &str, name: &str, columns: &[String]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| ident(c)).collect();
    format!(
        "CREATE INDEX {} ON {} ({})",
        ident(name),
        ident(table),
        cols.join(", ")
    )
}

/// Generate an ADD CONSTRAINT ... UNIQUE statement. Unique indices are
/// backed by constraints so dropping them goes through DROP CONSTRAINT.
pub fn add_unique_constraint(table: &str, name: &str, columns: &[String]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| ident(c)).collect();
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
        ident(table),
        ident(name),
        cols.join(", ")
    )
}

/// Generate the prefix-match index for a textual column. The operator
/// class makes `LIKE 'x%'` use the index under non-C collations.
pub fn create_like_index(table: &str, name: &str, column: &str, kind: &FieldKind) -> String {
    let ops = match kind {
        FieldKind::Varchar { .. } => "varchar_pattern_ops",
        _ => "text_pattern_ops",
    };
    format!(
        "CREATE INDEX {} ON {} ({} {})",
        ident(name),
        ident(table),
        ident(column),
        ops
    )
}

/// Generate the GIN index over a generated tsvector column.
pub fn create_fts_index(table: &str, name: &str, column: &str) -> String {
    format!(
        "CREATE INDEX {} ON {} USING gin ({})",
        ident(name),
        ident(table),
        ident(column)
    )
}

/// Generate a DROP INDEX statement.
pub fn drop_index(name: &str) -> String {
    format!("DROP INDEX {}", ident(name))
}

/// Generate a DROP CONSTRAINT statement.
pub fn drop_constraint(table: &str, name: &str) -> String {
    format!("ALTER TABLE {} DROP CONSTRAINT {}", ident(table), ident(name))
}

/// Generate an ALTER INDEX RENAME statement.
pub fn rename_index(old: &str, new: &str) -> String {
    format!("ALTER INDEX {} RENAME TO {}", ident(old), ident(new))
}

/// Generate an ADD CONSTRAINT ... FOREIGN KEY statement. Deferred so
/// cyclic graphs insert cleanly.
pub fn add_foreign_key(
    table: &str,
    name: &str,
    column: &str,
    referenced_table: &str,
    referenced_column: &str,
) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) DEFERRABLE INITIALLY DEFERRED",
        ident(table),
        ident(name),
        ident(column),
        ident(referenced_table),
        ident(referenced_column)
    )
}

/// The deterministic name of the foreign-key constraint on a column.
pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("{}_{}_fkey", table, column)
}

/// Generate CREATE OR REPLACE FUNCTION for a zero-argument function. The
/// body is dollar-quoted verbatim so `pg_proc.prosrc` round-trips it.
pub fn create_function(name: &str, returns: &str, body: &str) -> String {
    format!(
        "CREATE OR REPLACE FUNCTION {}() RETURNS {} AS $cubane${}$cubane$ LANGUAGE plpgsql",
        ident(name),
        returns,
        body
    )
}

/// Generate DROP FUNCTION from a signature like `my_fn()`.
pub fn drop_function(signature: &str) -> String {
    format!("DROP FUNCTION {}", signature)
}

/// Generate the BEFORE INSERT OR UPDATE row trigger.
pub fn create_trigger(table: &str, name: &str, function: &str) -> String {
    format!(
        "CREATE TRIGGER {} BEFORE INSERT OR UPDATE ON {} FOR EACH ROW EXECUTE FUNCTION {}()",
        ident(name),
        ident(table),
        ident(function)
    )
}

/// Generate DROP TRIGGER.
pub fn drop_trigger(table: &str, name: &str) -> String {
    format!("DROP TRIGGER {} ON {}", ident(name), ident(table))
}

/// Rewrite a generated tsvector column for every row.
pub fn fts_update(table: &str, column: &str, sources: &[String]) -> String {
    let expr = sources
        .iter()
        .map(|s| format!("coalesce({}, '')", ident(s)))
        .collect::<Vec<_>>()
        .join(" || ' ' || ");
    format!(
        "UPDATE {} SET {} = to_tsvector('english', {})",
        ident(table),
        ident(column),
        expr
    )
}

/// Lock tables exclusively for the rest of the transaction, without
/// waiting on conflicting holders.
pub fn lock_tables(tables: &[String]) -> String {
    let names: Vec<String> = tables.iter().map(|t| ident(t)).collect();
    format!(
        "LOCK TABLE {} IN ACCESS EXCLUSIVE MODE NOWAIT",
        names.join(", ")
    )
}
