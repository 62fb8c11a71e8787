//! TOML-backed fixture loading.
//!
//! After a successful commit the reconciler offers every model whose table
//! is empty to the loader. Seed rows live in one file per table:
//!
//! ```toml
//! # fixtures/part.toml
//! [[row]]
//! partno = "X-100"
//! name = "Widget"
//! ```
//!
//! A missing file simply means no fixtures for that model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use cubane_catalogue::{ModelDef, Value};
use cubane_migrate::{FixtureLoader, MigrateError, MigrateResult, SchemaDriver};

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(rename = "row", default)]
    rows: Vec<BTreeMap<String, Value>>,
}

/// Loads seed rows from `<dir>/<table>.toml`.
pub struct TomlFixtureLoader {
    dir: PathBuf,
}

impl TomlFixtureLoader {
    /// Create a loader reading from the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl FixtureLoader for TomlFixtureLoader {
    async fn load(&self, driver: &dyn SchemaDriver, model: &ModelDef) -> MigrateResult<usize> {
        let path = self.dir.join(format!("{}.toml", model.table));
        if !path.exists() {
            return Ok(0);
        }

        let text = std::fs::read_to_string(&path)?;
        let file: FixtureFile = toml::from_str(&text)
            .map_err(|e| MigrateError::fixture(format!("{}: {}", path.display(), e)))?;

        debug!(table = %model.table, rows = file.rows.len(), "Loading fixtures");

        let mut inserted = 0;
        for row in &file.rows {
            if let Some(unknown) = row.keys().find(|c| !model.has_column(c.as_str())) {
                return Err(MigrateError::fixture(format!(
                    "{}: unknown column '{}'",
                    path.display(),
                    unknown
                )));
            }

            let columns: Vec<String> = row.keys().map(|c| format!("\"{}\"", c)).collect();
            let values: Vec<String> = row.values().map(|v| driver.q(Some(v))).collect();
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                model.table,
                columns.join(", "),
                values.join(", ")
            );
            driver.execute_sql(&sql).await?;
            inserted += 1;
        }

        Ok(inserted)
    }
}
