//! Full-text-search installation.
//!
//! For each model declaring an [`FtsSpec`](cubane_catalogue::FtsSpec), one
//! generated tsvector column is maintained per group: populated from its
//! source columns, kept current by a trigger, and indexed with GIN. The
//! trigger function body is deterministic in the source list, so a changed
//! declaration is detected by comparing the stored function source.

use cubane_catalogue::{FTS_COLUMN_PREFIX, FieldDef, FieldKind, ModelDef};
use tracing::debug;

use crate::driver::SchemaDriver;
use crate::error::MigrateResult;
use crate::naming;
use crate::outcome::MigrationOutcome;

/// A model whose FTS columns were installed or re-wired during a run; the
/// user may be asked to rebuild them after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtsChange {
    /// Table carrying the generated column.
    pub table: String,
    /// The generated tsvector column.
    pub column: String,
    /// Source columns feeding it.
    pub sources: Vec<String>,
}

/// The trigger function body maintaining a generated column.
///
/// Configuration is fixed to `english`; multi-language FTS is a future
/// extension.
pub fn trigger_body(column: &str, sources: &[String]) -> String {
    let expr = sources
        .iter()
        .map(|s| format!("coalesce(new.\"{}\", '')", s))
        .collect::<Vec<_>>()
        .join(" || ' ' || ");
    format!(
        "begin\n    new.\"{}\" := to_tsvector('english', {});\n    return new;\nend;",
        column, expr
    )
}

/// Reconcile a model's generated FTS columns with its declaration.
///
/// Returns the groups that were installed or re-wired, so the caller can
/// offer a reindex after commit.
pub async fn install(
    driver: &dyn SchemaDriver,
    model: &ModelDef,
    outcome: &mut MigrationOutcome,
) -> MigrateResult<Vec<FtsChange>> {
    let table = &model.table;
    let empty = Default::default();
    let desired = model.fts.as_ref().map(|f| &f.groups).unwrap_or(&empty);

    // Drop generated columns no longer declared, with their trigger,
    // function and index.
    let live_fts: Vec<String> = driver
        .get_column_names(table)
        .await?
        .into_iter()
        .filter(|c| c.starts_with(FTS_COLUMN_PREFIX))
        .collect();

    for column in &live_fts {
        if desired.contains_key(column) {
            continue;
        }
        debug!(table = %table, column = %column, "Removing deprecated FTS column");
        remove_group(driver, table, column).await?;
        outcome.fts_removed += 1;
    }

    // Install or re-wire declared groups.
    let mut changes = Vec::new();
    for (column, sources) in desired {
        let function = naming::fts_function_name(table, column);
        let trigger = naming::fts_trigger_name(table, column);
        let body = trigger_body(column, sources);
        let mut changed = false;

        if !driver.column_exists(table, column).await? {
            let mut field = FieldDef::new(column.clone(), FieldKind::TsVector);
            field.nullable = true;
            driver.create_column(table, &field).await?;
            driver.fts_index(table, column, sources).await?;
            changed = true;
        }

        if driver.function_source(&function).await?.as_deref() != Some(body.as_str()) {
            if driver.trigger_exists(table, &trigger).await? {
                driver.drop_trigger(table, &trigger).await?;
            }
            if driver.function_exists(&function).await? {
                driver.drop_function(&format!("{}()", function)).await?;
            }
            driver.create_function(&function, "trigger", &body).await?;
            driver.create_trigger(table, &trigger, &function).await?;
            changed = true;
        } else if !driver.trigger_exists(table, &trigger).await? {
            driver.create_trigger(table, &trigger, &function).await?;
            changed = true;
        }

        let index = naming::fts_index_name(table, column);
        if !driver.index_exists(&index).await? {
            driver.create_fts_index(table, column).await?;
        }

        if changed {
            outcome.fts_installed += 1;
            changes.push(FtsChange {
                table: table.clone(),
                column: column.clone(),
                sources: sources.clone(),
            });
        }
    }

    Ok(changes)
}

/// Remove one generated column and everything attached to it.
async fn remove_group(
    driver: &dyn SchemaDriver,
    table: &str,
    column: &str,
) -> MigrateResult<()> {
    let trigger = naming::fts_trigger_name(table, column);
    if driver.trigger_exists(table, &trigger).await? {
        driver.drop_trigger(table, &trigger).await?;
    }

    let function = naming::fts_function_name(table, column);
    if driver.function_exists(&function).await? {
        driver.drop_function(&format!("{}()", function)).await?;
    }

    let index = naming::fts_index_name(table, column);
    if driver.index_exists(&index).await? {
        driver.drop_index(table, &index).await?;
    }

    driver.drop_column(table, column).await
}
