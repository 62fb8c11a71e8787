//! The PostgreSQL implementation of the schema-driver seam.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cubane_catalogue::{FieldDef, FieldKind, ModelDef};
use cubane_migrate::{ColumnDefault, ForeignKey, MigrateResult, SchemaDriver};
use tracing::debug;

use crate::config::PgConfig;
use crate::connection::PgConnection;
use crate::error::PgResult;
use crate::sql;

/// Schema of the target database objects.
const SCHEMA: &str = "public";

/// PostgreSQL schema driver over a single connection.
///
/// Mutations are counted so callers can observe whether a run issued any
/// DDL (the idempotence check, dry-run reporting).
pub struct PgDriver {
    conn: PgConnection,
    statements: AtomicU64,
}

impl PgDriver {
    /// Connect from a database URL.
    pub async fn connect(url: impl Into<String>) -> PgResult<Self> {
        let config = PgConfig::from_url(url)?;
        Self::from_config(&config).await
    }

    /// Connect from a parsed configuration.
    pub async fn from_config(config: &PgConfig) -> PgResult<Self> {
        let conn = PgConnection::open(config).await?;
        Ok(Self {
            conn,
            statements: AtomicU64::new(0),
        })
    }

    /// Issue a mutating statement and count it.
    async fn mutate(&self, sql: &str) -> MigrateResult<()> {
        self.conn.batch_execute(sql).await?;
        self.statements.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Run a `SELECT EXISTS (...)` query.
    async fn exists(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> MigrateResult<bool> {
        let row = self.conn.query_one(sql, params).await?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl SchemaDriver for PgDriver {
    // --- transaction control -------------------------------------------

    async fn begin(&self) -> MigrateResult<()> {
        debug!("Beginning transaction");
        self.conn.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&self) -> MigrateResult<()> {
        debug!("Committing transaction");
        self.conn.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> MigrateResult<()> {
        debug!("Rolling back transaction");
        self.conn.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    async fn lock(&self, tables: &[String]) -> MigrateResult<()> {
        debug!(tables = ?tables, "Locking tables");
        self.conn.batch_execute(&sql::lock_tables(tables)).await?;
        Ok(())
    }

    // --- introspection -------------------------------------------------

    async fn get_table_names(&self) -> MigrateResult<BTreeSet<String>> {
        let rows = self
            .conn
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
                 ORDER BY table_name",
                &[&SCHEMA],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = $1 AND table_name = $2 AND table_type = 'BASE TABLE')",
            &[&SCHEMA, &table],
        )
        .await
    }

    async fn get_column_names(&self, table: &str) -> MigrateResult<Vec<String>> {
        let rows = self
            .conn
            .query(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 \
                 ORDER BY ordinal_position",
                &[&SCHEMA, &table],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn column_exists(&self, table: &str, column: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 AND column_name = $3)",
            &[&SCHEMA, &table, &column],
        )
        .await
    }

    async fn column_is_nullable(&self, table: &str, column: &str) -> MigrateResult<bool> {
        let row = self
            .conn
            .query_one(
                "SELECT is_nullable = 'YES' FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
                &[&SCHEMA, &table, &column],
            )
            .await?;
        Ok(row.get(0))
    }

    async fn get_column_default(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<Option<String>> {
        let row = self
            .conn
            .query_one(
                "SELECT column_default FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
                &[&SCHEMA, &table, &column],
            )
            .await?;
        Ok(row.get(0))
    }

    async fn get_column_datatype(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<(String, Option<u32>)> {
        let row = self
            .conn
            .query_one(
                "SELECT data_type, udt_name, character_maximum_length \
                 FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
                &[&SCHEMA, &table, &column],
            )
            .await?;
        let data_type: String = row.get(0);
        let udt_name: String = row.get(1);
        let max_length: Option<i32> = row.get(2);

        // Extension types (tsvector) report USER-DEFINED; the udt name is
        // the one we compare against.
        let name = if data_type == "USER-DEFINED" {
            udt_name
        } else {
            data_type
        };
        Ok((name, max_length.map(|n| n as u32)))
    }

    async fn get_indices(&self, table: &str) -> MigrateResult<BTreeSet<String>> {
        let rows = self
            .conn
            .query(
                "SELECT indexname FROM pg_indexes \
                 WHERE schemaname = $1 AND tablename = $2",
                &[&SCHEMA, &table],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn index_exists(&self, name: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM pg_indexes \
             WHERE schemaname = $1 AND indexname = $2)",
            &[&SCHEMA, &name],
        )
        .await
    }

    async fn is_index_unique(&self, name: &str) -> MigrateResult<bool> {
        let row = self
            .conn
            .query_opt(
                "SELECT i.indisunique FROM pg_index i \
                 JOIN pg_class c ON c.oid = i.indexrelid \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE n.nspname = $1 AND c.relname = $2",
                &[&SCHEMA, &name],
            )
            .await?;
        Ok(row.map(|r| r.get(0)).unwrap_or(false))
    }

    async fn constraint_exists(&self, table: &str, name: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM information_schema.table_constraints \
             WHERE table_schema = $1 AND table_name = $2 AND constraint_name = $3)",
            &[&SCHEMA, &table, &name],
        )
        .await
    }

    async fn foreign_key_constraint_exists(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<bool> {
        let fks = self.foreign_keys_on(table, column).await?;
        Ok(fks.iter().any(|fk| {
            fk.referenced_table == referenced_table && fk.referenced_column == referenced_column
        }))
    }

    async fn foreign_keys_on(
        &self,
        table: &str,
        column: &str,
    ) -> MigrateResult<Vec<ForeignKey>> {
        let rows = self
            .conn
            .query(
                "SELECT tc.constraint_name, ccu.table_name, ccu.column_name \
                 FROM information_schema.table_constraints tc \
                 JOIN information_schema.key_column_usage kcu \
                   ON tc.constraint_name = kcu.constraint_name \
                  AND tc.table_schema = kcu.table_schema \
                 JOIN information_schema.constraint_column_usage ccu \
                   ON ccu.constraint_name = tc.constraint_name \
                  AND ccu.table_schema = tc.table_schema \
                 WHERE tc.constraint_type = 'FOREIGN KEY' \
                   AND tc.table_schema = $1 AND tc.table_name = $2 \
                   AND kcu.column_name = $3",
                &[&SCHEMA, &table, &column],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|r| ForeignKey {
                name: r.get(0),
                referenced_table: r.get(1),
                referenced_column: r.get(2),
            })
            .collect())
    }

    async fn get_triggers(&self, table: &str) -> MigrateResult<BTreeSet<String>> {
        let rows = self
            .conn
            .query(
                "SELECT t.tgname FROM pg_trigger t \
                 JOIN pg_class c ON c.oid = t.tgrelid \
                 JOIN pg_namespace n ON n.oid = c.relnamespace \
                 WHERE n.nspname = $1 AND c.relname = $2 AND NOT t.tgisinternal",
                &[&SCHEMA, &table],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    async fn trigger_exists(&self, table: &str, name: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM pg_trigger t \
             JOIN pg_class c ON c.oid = t.tgrelid \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = $1 AND c.relname = $2 AND t.tgname = $3 \
               AND NOT t.tgisinternal)",
            &[&SCHEMA, &table, &name],
        )
        .await
    }

    async fn function_exists(&self, name: &str) -> MigrateResult<bool> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM pg_proc p \
             JOIN pg_namespace n ON n.oid = p.pronamespace \
             WHERE n.nspname = $1 AND p.proname = $2)",
            &[&SCHEMA, &name],
        )
        .await
    }

    async fn function_source(&self, name: &str) -> MigrateResult<Option<String>> {
        let row = self
            .conn
            .query_opt(
                "SELECT p.prosrc FROM pg_proc p \
                 JOIN pg_namespace n ON n.oid = p.pronamespace \
                 WHERE n.nspname = $1 AND p.proname = $2",
                &[&SCHEMA, &name],
            )
            .await?;
        Ok(row.map(|r| r.get(0)))
    }

    async fn has_null_value(&self, table: &str, column: &str) -> MigrateResult<bool> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE {} IS NULL)",
            sql::ident(table),
            sql::ident(column)
        );
        self.exists(&query, &[]).await
    }

    async fn table_is_empty(&self, table: &str) -> MigrateResult<bool> {
        let query = format!(
            "SELECT NOT EXISTS (SELECT 1 FROM {})",
            sql::ident(table)
        );
        self.exists(&query, &[]).await
    }

    // --- mutation: tables ----------------------------------------------

    async fn create_table(&self, model: &ModelDef) -> MigrateResult<()> {
        self.mutate(&sql::create_table(model)).await
    }

    async fn rename_table(&self, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(&sql::rename_table(old, new)).await
    }

    async fn drop_table(&self, table: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_table(table)).await
    }

    // --- mutation: columns ---------------------------------------------

    async fn create_column(&self, table: &str, field: &FieldDef) -> MigrateResult<()> {
        self.mutate(&sql::add_column(table, field)).await
    }

    async fn rename_column(&self, table: &str, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(&sql::rename_column(table, old, new)).await
    }

    async fn drop_column(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_column(table, column)).await
    }

    async fn change_column_data_type(
        &self,
        table: &str,
        column: &str,
        kind: &FieldKind,
    ) -> MigrateResult<()> {
        self.mutate(&sql::change_column_type(table, column, kind)).await
    }

    async fn update_varchar_length(
        &self,
        table: &str,
        column: &str,
        max_length: u32,
    ) -> MigrateResult<()> {
        self.mutate(&sql::update_varchar_length(table, column, max_length))
            .await
    }

    async fn make_nullable(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(&sql::make_nullable(table, column)).await
    }

    async fn make_not_nullable(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(&sql::make_not_nullable(table, column)).await
    }

    async fn set_column_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()> {
        self.mutate(&sql::set_default(table, column, default)).await
    }

    async fn drop_column_default(&self, table: &str, column: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_default(table, column)).await
    }

    async fn update_null_to_default(
        &self,
        table: &str,
        column: &str,
        default: &ColumnDefault,
    ) -> MigrateResult<()> {
        self.mutate(&sql::update_null_to_default(table, column, default))
            .await
    }

    // --- mutation: indices ---------------------------------------------

    async fn create_index(
        &self,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> MigrateResult<()> {
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        let name = self.get_index_name(table, &refs, unique);
        if unique {
            self.mutate(&sql::add_unique_constraint(table, &name, columns))
                .await
        } else {
            self.mutate(&sql::create_index(table, &name, columns)).await
        }
    }

    async fn create_like_index(
        &self,
        table: &str,
        column: &str,
        kind: &FieldKind,
    ) -> MigrateResult<()> {
        let name = self.get_like_index_name(table, column);
        self.mutate(&sql::create_like_index(table, &name, column, kind))
            .await
    }

    async fn create_fts_index(&self, table: &str, column: &str) -> MigrateResult<()> {
        let name = self.get_fts_index_name(table, column);
        self.mutate(&sql::create_fts_index(table, &name, column)).await
    }

    async fn drop_index(&self, table: &str, name: &str) -> MigrateResult<()> {
        // Unique indices are backed by constraints; dropping the
        // constraint drops the index with it.
        if self.constraint_exists(table, name).await? {
            self.mutate(&sql::drop_constraint(table, name)).await
        } else {
            self.mutate(&sql::drop_index(name)).await
        }
    }

    async fn rename_index(&self, old: &str, new: &str) -> MigrateResult<()> {
        self.mutate(&sql::rename_index(old, new)).await
    }

    // --- mutation: constraints -----------------------------------------

    async fn create_foreign_key_constraint(
        &self,
        table: &str,
        column: &str,
        referenced_table: &str,
        referenced_column: &str,
    ) -> MigrateResult<()> {
        let name = sql::foreign_key_name(table, column);
        self.mutate(&sql::add_foreign_key(
            table,
            &name,
            column,
            referenced_table,
            referenced_column,
        ))
        .await
    }

    async fn drop_foreign_key_constraint(&self, table: &str, name: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_constraint(table, name)).await
    }

    // --- mutation: functions and triggers ------------------------------

    async fn create_function(
        &self,
        name: &str,
        returns: &str,
        body: &str,
    ) -> MigrateResult<()> {
        self.mutate(&sql::create_function(name, returns, body)).await
    }

    async fn drop_function(&self, signature: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_function(signature)).await
    }

    async fn create_trigger(
        &self,
        table: &str,
        name: &str,
        function: &str,
    ) -> MigrateResult<()> {
        self.mutate(&sql::create_trigger(table, name, function)).await
    }

    async fn drop_trigger(&self, table: &str, name: &str) -> MigrateResult<()> {
        self.mutate(&sql::drop_trigger(table, name)).await
    }

    // --- full-text search ----------------------------------------------

    async fn fts_index(
        &self,
        table: &str,
        column: &str,
        sources: &[String],
    ) -> MigrateResult<()> {
        self.mutate(&sql::fts_update(table, column, sources)).await
    }

    // --- collaborator escape hatch -------------------------------------

    async fn execute_sql(&self, sql: &str) -> MigrateResult<u64> {
        let count = self.conn.execute(sql, &[]).await?;
        self.statements.fetch_add(1, Ordering::Relaxed);
        Ok(count)
    }

    // --- vendor mapping ------------------------------------------------

    fn expected_datatype(&self, kind: &FieldKind) -> (String, Option<u32>) {
        sql::normalized_type(kind)
    }

    fn statements_issued(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }
}
