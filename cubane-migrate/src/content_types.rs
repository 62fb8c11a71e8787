//! Content-type bookkeeping across table renames.
//!
//! Hosts commonly keep a table mapping model names to stable ids. That
//! table is not part of the declared catalogue, so it is treated as an
//! external collaborator: the reconciler notifies registered observers
//! about every table rename, inside the same transaction.

use async_trait::async_trait;
use cubane_catalogue::{ModelDef, Value};
use tracing::debug;

use crate::driver::SchemaDriver;
use crate::error::MigrateResult;

/// Observes table renames during a run.
#[async_trait]
pub trait RenameObserver: Send + Sync {
    /// Called once per renamed model, after the `ALTER TABLE ... RENAME`
    /// and before the final confirmation.
    async fn table_renamed(
        &self,
        driver: &dyn SchemaDriver,
        model: &ModelDef,
        old_table: &str,
    ) -> MigrateResult<()>;
}

/// Rewrites a host-maintained content-type table so renamed models remain
/// resolvable. One UPDATE per renamed model; a missing bookkeeping table
/// is not an error.
pub struct ContentTypeTable {
    table: String,
}

impl ContentTypeTable {
    /// Use the conventional `content_types` table.
    pub fn new() -> Self {
        Self::with_table("content_types")
    }

    /// Use a custom bookkeeping table.
    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenameObserver for ContentTypeTable {
    async fn table_renamed(
        &self,
        driver: &dyn SchemaDriver,
        model: &ModelDef,
        old_table: &str,
    ) -> MigrateResult<()> {
        if !driver.table_exists(&self.table).await? {
            return Ok(());
        }

        debug!(table = %self.table, old = %old_table, new = %model.table, "Updating content types");
        let sql = format!(
            "UPDATE \"{}\" SET \"table_name\" = {}, \"model\" = {} WHERE \"table_name\" = {}",
            self.table,
            driver.q(Some(&Value::text(model.table.clone()))),
            driver.q(Some(&Value::text(model.name.to_lowercase()))),
            driver.q(Some(&Value::text(old_table))),
        );
        driver.execute_sql(&sql).await?;
        Ok(())
    }
}
