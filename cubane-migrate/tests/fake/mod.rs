//! In-memory driver and scripted prompter for reconciler tests.
//!
//! The fake mirrors the PostgreSQL driver closely enough to exercise the
//! reconciler: the same normalized type vocabulary, snapshot-based
//! transactions, constraint-backed unique indices, and row data for the
//! data-preservation properties.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use cubane_catalogue::{FieldDef, FieldKind, ModelDef, Value};
use cubane_migrate::driver::default_literal;
use cubane_migrate::{
    ColumnDefault, ForeignKey, MigrateError, MigrateResult, Prompter, SchemaDriver, naming,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeColumn {
    pub datatype: String,
    pub max_length: Option<u32>,
    pub nullable: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeIndex {
    pub columns: Vec<String>,
    pub unique: bool,
    /// Unique indices are backed by constraints, like the real driver.
    pub constraint: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeFk {
    pub name: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeTable {
    /// `(name, column)` in ordinal order.
    pub columns: Vec<(String, FakeColumn)>,
    pub indices: BTreeMap<String, FakeIndex>,
    pub triggers: BTreeSet<String>,
    pub foreign_keys: Vec<FakeFk>,
    /// Rows as `column -> value`; NULL is `None`.
    pub rows: Vec<BTreeMap<String, Option<String>>>,
}

impl FakeTable {
    pub fn column(&self, name: &str) -> Option<&FakeColumn> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut FakeColumn> {
        self.columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeDb {
    pub tables: BTreeMap<String, FakeTable>,
    /// `function name -> body`.
    pub functions: BTreeMap<String, String>,
}

#[derive(Default)]
struct Inner {
    db: FakeDb,
    snapshot: Option<FakeDb>,
    statements: u64,
    sql_log: Vec<String>,
}

/// An in-memory [`SchemaDriver`].
#[derive(Default)]
pub struct FakeDriver {
    state: Mutex<Inner>,
}

fn datatype_of(kind: &FieldKind) -> (String, Option<u32>) {
    match kind {
        FieldKind::Int | FieldKind::ForeignKey { .. } => ("integer".to_string(), None),
        FieldKind::BigInt => ("bigint".to_string(), None),
        FieldKind::SmallInt => ("smallint".to_string(), None),
        FieldKind::Float => ("double precision".to_string(), None),
        FieldKind::Decimal { .. } => ("numeric".to_string(), None),
        FieldKind::Text => ("text".to_string(), None),
        FieldKind::Varchar { max_length } => ("character varying".to_string(), Some(*max_length)),
        FieldKind::Bool => ("boolean".to_string(), None),
        FieldKind::Date => ("date".to_string(), None),
        FieldKind::Time => ("time without time zone".to_string(), None),
        FieldKind::TimestampTz => ("timestamp with time zone".to_string(), None),
        FieldKind::TsVector => ("tsvector".to_string(), None),
    }
}

/// The plain (unquoted) value a default writes into a row.
fn plain_value(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Now => "now".to_string(),
        ColumnDefault::Value(v) => match v {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
        },
    }
}

fn fake_column(field: &FieldDef) -> FakeColumn {
    let (datatype, max_length) = datatype_of(&field.kind);
    let default = if field.auto_increment {
        Some("nextval('seq'::regclass)".to_string())
    } else {
        default_literal(
            cubane_migrate::effective_default(field).as_ref(),
        )
    };
    FakeColumn {
        datatype,
        max_length,
        nullable: field.nullable && !field.primary_key,
        default,
    }
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A deep copy of the live schema, for before/after comparisons.
    pub fn db(&self) -> FakeDb {
        self.state.lock().unwrap().db.clone()
    }

    /// A deep copy of one table; panics when absent.
    pub fn table(&self, name: &str) -> FakeTable {
        self.state.lock().unwrap().db.tables[name].clone()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.state.lock().unwrap().db.tables.contains_key(name)
    }

    /// Raw statements routed through `execute_sql`.
    pub fn sql_log(&self) -> Vec<String> {
        self.state.lock().unwrap().sql_log.clone()
    }

    /// Seed a bare table outside any transaction (host-owned tables,
    /// out-of-band state).
    pub fn seed_table(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .db
            .tables
            .insert(name.to_string(), FakeTable::default());
    }

    /// Seed an out-of-band index, as `CREATE INDEX` by hand would.
    pub fn seed_index(&self, table: &str, name: &str, columns: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let table = state.db.tables.get_mut(table).unwrap();
        table.indices.insert(
            name.to_string(),
            FakeIndex {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                unique: false,
                constraint: false,
            },
        );
    }

    /// Insert a row; unspecified columns are NULL.
    pub fn insert_row(&self, table: &str, values: &[(&str, Option<&str>)]) {
        let mut state = self.state.lock().unwrap();
        let table = state.db.tables.get_mut(table).unwrap();
        let mut row: BTreeMap<String, Option<String>> = table
            .columns
            .iter()
            .map(|(name, _)| (name.clone(), None))
            .collect();
        for (column, value) in values {
            row.insert(column.to_string(), value.map(String::from));
        }
        table.rows.push(row);
    }

    /// All values of one column, in insertion order.
    pub fn column_values(&self, table: &str, column: &str) -> Vec<Option<String>> {
        self.state.lock().unwrap().db.tables[table]
            .rows
            .iter()
            .map(|r| r.get(column).cloned().flatten())
            .collect()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut FakeDb) -> MigrateResult<T>) -> MigrateResult<T> {
        self.with(|state| {
            let result = f(&mut state.db)?;
            state.statements += 1;
            Ok(result)
        })
    }

    fn read<T>(&self, f: impl FnOnce(&FakeDb) -> T) -> T {
        self.with(|state| f(&state.db))
    }
}

fn table_of<'a>(db: &'a mut FakeDb, name: &str) -> MigrateResult<&'a mut FakeTable> {
    db.tables
        .get_mut(name)
        .ok_or_else(|| MigrateError::driver(format!("no such table '{}'", name)))
}

fn table_ref<'a>(db: &'a FakeDb, name: &str) -> MigrateResult<&'a FakeTable> {
    db.tables
        .get(name)
        .ok_or_else(|| MigrateError::driver(format!("no such table '{}'", name)))
}

#[async_trait]
impl SchemaDriver for FakeDriver {
    async fn begin(&self) -> MigrateResult<()> {
        self.with(|state| {
            state.snapshot = Some(state.db.clone());
        });
        Ok(())
    }

    async fn commit(&self) -> MigrateResult<()> {
        self.with(|state| {
            state.snapshot = None;
        });
        Ok(())
    }

    async fn rollback(&self) -> MigrateResult<()> {
        self.with(|state| {
            if let Some(snapshot) = state.snapshot.take() {
                state.db = snapshot;
            }
        });
        Ok(())
    }

    async fn lock(&self, tables: &[String]) -> MigrateResult<()> {
        self.read(|db| {
            for table in tables {
                if !db.tables.contains_key(table) {
                    return Err(MigrateError::lock_failed(table.clone()));
                }
            }
            Ok(())
        })
    }

    async fn get_table_names(&self) -> MigrateResult<BTreeSet<String>> {
        Ok(self.read(|db| db.tables.keys().cloned().collect()))
    }

    async fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        Ok(self.read(|db| db.tables.contains_key(table)))
    }

    async fn get_column_names(&self, table: &str) -> MigrateResult<Vec<String>> {
        self.read(|db| {
            Ok(table_ref(db, table)?
                .columns
                .iter()
                .map(|(n, _)| n.clone())
                .collect())
        })
    }

    async fn column_exists(&self, table: &str, column: &str) -> MigrateResult<bool> {
        self.read(|db| Ok(table_ref(db, table)?.column(column).is_some()))
    }

    async fn column_is_nullable(&self, table: &str, column: &str) -> MigrateResult<bool> {
        self.read(|db| {
            table_ref(db, table)?
                .column(column)
                .map(|c| c.nullable)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))
        })
    }

    async fn get_column_default(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<Option<String>> {
        self.read(|db| {
            table_ref(db, table)?
                .column(column)
                .map(|c| c.default.clone())
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))
        })
    }

    async fn get_column_datatype(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<(String, Option<u32>)> {
        self.read(|db| {
            table_ref(db, table)?
                .column(column)
                .map(|c| (c.datatype.clone(), c.max_length))
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))
        })
    }

    async fn get_indices(&self, table: &str) -> MigrateResult<BTreeSet<String>> {
        self.read(|db| Ok(table_ref(db, table)?.indices.keys().cloned().collect()))
    }

    async fn index_exists(&self, name: &str) -> MigrateResult<bool> {
        Ok(self.read(|db| db.tables.values().any(|t| t.indices.contains_key(name))))
    }

    async fn is_index_unique(&self, name: &str) -> MigrateResult<bool> {
        Ok(self.read(|db| {
            db.tables
                .values()
                .find_map(|t| t.indices.get(name))
                .is_some_and(|i| i.unique)
        }))
    }

    async fn constraint_exists(&self, table: &str, name: &str) -> MigrateResult<bool> {
        self.read(|db| {
            let t = table_ref(db, table)?;
            Ok(t.indices.get(name).is_some_and(|i| i.constraint)
                || t.foreign_keys.iter().any(|fk| fk.name == name))
        })
    }

    async fn foreign_key_constraint_exists(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<bool> {
        self.read(|db| {
            Ok(table_ref(db, table)?.foreign_keys.iter().any(|fk| {
                fk.column == column
                    && fk.referenced_table == referenced_table
                    && fk.referenced_column == referenced_column
            }))
        })
    }

    async fn foreign_keys_on(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<Vec<ForeignKey>> {
        self.read(|db| {
            Ok(table_ref(db, table)?
                .foreign_keys
                .iter()
                .filter(|fk| fk.column == column)
                .map(|fk| ForeignKey {
                    name: fk.name.clone(),
                    referenced_table: fk.referenced_table.clone(),
                    referenced_column: fk.referenced_column.clone(),
                })
                .collect())
        })
    }

    async fn get_triggers(&self, table: &str) -> MigrateResult<BTreeSet<String>> {
        self.read(|db| Ok(table_ref(db, table)?.triggers.clone()))
    }

    async fn trigger_exists(&self, table: &str, name: &str) -> MigrateResult<bool> {
        self.read(|db| Ok(table_ref(db, table)?.triggers.contains(name)))
    }

    async fn function_exists(&self, name: &str) -> MigrateResult<bool> {
        Ok(self.read(|db| db.functions.contains_key(name)))
    }

    async fn function_source(&self, name: &str) -> MigrateResult<Option<String>> {
        Ok(self.read(|db| db.functions.get(name).cloned()))
    }

    async fn has_null_value(&self, table: &str, column: &str) -> MigrateResult<bool> {
        self.read(|db| {
            Ok(table_ref(db, table)?
                .rows
                .iter()
                .any(|r| r.get(column).is_none_or(|v| v.is_none())))
        })
    }

    async fn table_is_empty(&self, table: &str) -> MigrateResult<bool> {
        self.read(|db| Ok(table_ref(db, table)?.rows.is_empty()))
    }

    async fn create_table(&self, model: &ModelDef) -> MigrateResult<()> {
        self.mutate(|db| {
            let mut table = FakeTable::default();
            for field in &model.fields {
                table
                    .columns
                    .push((field.column_name().to_string(), fake_column(field)));
                if field.primary_key {
                    table.indices.insert(
                        format!("{}_pkey", model.table),
                        FakeIndex {
                            columns: vec![field.column_name().to_string()],
                            unique: true,
                            constraint: true,
                        },
                    );
                }
            }
            db.tables.insert(model.table.clone(), table);
            Ok(())
        })
    }

    async fn rename_table(&self, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let table = db
                .tables
                .remove(old)
                .ok_or_else(|| MigrateError::driver(format!("no such table '{}'", old)))?;
            db.tables.insert(new.to_string(), table);
            Ok(())
        })
    }

    async fn drop_table(&self, table: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            db.tables
                .remove(table)
                .ok_or_else(|| MigrateError::driver(format!("no such table '{}'", table)))?;
            Ok(())
        })
    }

    async fn create_column(&self, table: &str, field: &FieldDef) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            let column = fake_column(field);
            let backfill = cubane_migrate::effective_default(field)
                .as_ref()
                .map(plain_value);
            if backfill.is_none() && !column.nullable && !t.rows.is_empty() {
                return Err(MigrateError::driver(format!(
                    "column '{}' contains null values",
                    field.column_name()
                )));
            }
            for row in &mut t.rows {
                row.insert(field.column_name().to_string(), backfill.clone());
            }
            t.columns.push((field.column_name().to_string(), column));
            Ok(())
        })
    }

    async fn rename_column(&self, table: &str, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            let slot = t
                .columns
                .iter_mut()
                .find(|(n, _)| n == old)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", old)))?;
            slot.0 = new.to_string();
            for row in &mut t.rows {
                if let Some(value) = row.remove(old) {
                    row.insert(new.to_string(), value);
                }
            }
            Ok(())
        })
    }

    async fn drop_column(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            t.columns.retain(|(n, _)| n != column);
            for row in &mut t.rows {
                row.remove(column);
            }
            // Dependent indices go with the column, as in PostgreSQL.
            t.indices
                .retain(|_, ix| !ix.columns.iter().any(|c| c == column));
            Ok(())
        })
    }

    async fn change_column_data_type(
        &self,
        table: &str,
        column: &str,
        kind: &FieldKind,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            let c = t
                .column_mut(column)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))?;
            let (datatype, max_length) = datatype_of(kind);
            c.datatype = datatype;
            c.max_length = max_length;
            Ok(())
        })
    }

    async fn update_varchar_length(
        &self,
        table: &str,
        column: &str,
        max_length: u32,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            for row in &mut t.rows {
                if let Some(Some(value)) = row.get_mut(column) {
                    if value.chars().count() > max_length as usize {
                        *value = value.chars().take(max_length as usize).collect();
                    }
                }
            }
            Ok(())
        })
    }

    async fn make_nullable(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            t.column_mut(column)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))?
                .nullable = true;
            Ok(())
        })
    }

    async fn make_not_nullable(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            if t.rows
                .iter()
                .any(|r| r.get(column).is_none_or(|v| v.is_none()))
            {
                return Err(MigrateError::driver(format!(
                    "column '{}' contains null values",
                    column
                )));
            }
            t.column_mut(column)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))?
                .nullable = false;
            Ok(())
        })
    }

    async fn set_column_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            t.column_mut(column)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))?
                .default = default_literal(Some(default));
            Ok(())
        })
    }

    async fn drop_column_default(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            t.column_mut(column)
                .ok_or_else(|| MigrateError::driver(format!("no such column '{}'", column)))?
                .default = None;
            Ok(())
        })
    }

    async fn update_null_to_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            let value = plain_value(default);
            for row in &mut t.rows {
                let slot = row.entry(column.to_string()).or_insert(None);
                if slot.is_none() {
                    *slot = Some(value.clone());
                }
            }
            Ok(())
        })
    }

    async fn create_index(
        &self,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> MigrateResult<()> {
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        let name = naming::index_name(table, &refs, unique);
        self.mutate(|db| {
            table_of(db, table)?.indices.insert(
                name,
                FakeIndex {
                    columns: columns.to_vec(),
                    unique,
                    constraint: unique,
                },
            );
            Ok(())
        })
    }

    async fn create_like_index(
        &self,
        table: &str,
        column: &str,
        _kind: &FieldKind,
    ) -> MigrateResult<()> {
        let name = naming::like_index_name(table, column);
        self.mutate(|db| {
            table_of(db, table)?.indices.insert(
                name,
                FakeIndex {
                    columns: vec![column.to_string()],
                    unique: false,
                    constraint: false,
                },
            );
            Ok(())
        })
    }

    async fn create_fts_index(&self, table: &str, column: &str) -> MigrateResult<()> {
        let name = naming::fts_index_name(table, column);
        self.mutate(|db| {
            table_of(db, table)?.indices.insert(
                name,
                FakeIndex {
                    columns: vec![column.to_string()],
                    unique: false,
                    constraint: false,
                },
            );
            Ok(())
        })
    }

    async fn drop_index(&self, table: &str, name: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            table_of(db, table)?
                .indices
                .remove(name)
                .ok_or_else(|| MigrateError::driver(format!("no such index '{}'", name)))?;
            Ok(())
        })
    }

    async fn rename_index(&self, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            for table in db.tables.values_mut() {
                if let Some(index) = table.indices.remove(old) {
                    table.indices.insert(new.to_string(), index);
                    return Ok(());
                }
            }
            Err(MigrateError::driver(format!("no such index '{}'", old)))
        })
    }

    async fn create_foreign_key_constraint(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            if !db.tables.contains_key(referenced_table) {
                return Err(MigrateError::driver(format!(
                    "no such table '{}'",
                    referenced_table
                )));
            }
            table_of(db, table)?.foreign_keys.push(FakeFk {
                name: format!("{}_{}_fkey", table, column),
                column: column.to_string(),
                referenced_table: referenced_table.to_string(),
                referenced_column: referenced_column.to_string(),
            });
            Ok(())
        })
    }

    async fn drop_foreign_key_constraint(&self, table: &str, name: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            table_of(db, table)?.foreign_keys.retain(|fk| fk.name != name);
            Ok(())
        })
    }

    async fn create_function(
        &self,
        name: &str,
        _returns: &str,
        body: &str,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            db.functions.insert(name.to_string(), body.to_string());
            Ok(())
        })
    }

    async fn drop_function(&self, signature: &str) -> MigrateResult<()> {
        let name = signature.trim_end_matches("()").to_string();
        self.mutate(|db| {
            db.functions
                .remove(&name)
                .ok_or_else(|| MigrateError::driver(format!("no such function '{}'", name)))?;
            Ok(())
        })
    }

    async fn create_trigger(
        &self,
        table: &str,
        name: &str,
        _function: &str,
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            table_of(db, table)?.triggers.insert(name.to_string());
            Ok(())
        })
    }

    async fn drop_trigger(&self, table: &str, name: &str) -> MigrateResult<()> {
        self.mutate(|db| {
            table_of(db, table)?.triggers.remove(name);
            Ok(())
        })
    }

    async fn fts_index(
        &self,
        table: &str,
        column: &str,
        sources: &[String],
    ) -> MigrateResult<()> {
        self.mutate(|db| {
            let t = table_of(db, table)?;
            for row in &mut t.rows {
                let text = sources
                    .iter()
                    .map(|s| row.get(s).cloned().flatten().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(" ");
                row.insert(column.to_string(), Some(text));
            }
            Ok(())
        })
    }

    async fn execute_sql(&self, sql: &str) -> MigrateResult<u64> {
        self.with(|state| {
            state.statements += 1;
            state.sql_log.push(sql.to_string());
        });
        Ok(0)
    }

    fn expected_datatype(&self, kind: &FieldKind) -> (String, Option<u32>) {
        datatype_of(kind)
    }

    fn statements_issued(&self) -> u64 {
        self.with(|state| state.statements)
    }
}

/// Prompter answering from a fixed script. Option questions match the
/// scripted answer against the option labels; confirmations expect
/// "yes"/"no". An exhausted script falls back to the default.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str, options: &[String], default: usize) -> MigrateResult<usize> {
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => options
                .iter()
                .position(|o| *o == answer)
                .ok_or_else(|| {
                    MigrateError::driver(format!(
                        "scripted answer '{}' not offered for '{}'",
                        answer, question
                    ))
                }),
            None => Ok(default),
        }
    }

    fn ask_confirm(&self, _question: &str, default: bool) -> MigrateResult<bool> {
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => Ok(answer == "yes"),
            None => Ok(default),
        }
    }
}
