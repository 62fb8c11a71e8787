//! Caller-supplied extra indices, applied after field-driven indexing.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::warn;

use cubane_catalogue::ModelDef;

use crate::driver::SchemaDriver;
use crate::error::MigrateResult;
use crate::naming;
use crate::outcome::MigrationOutcome;

/// An extra index requested for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSpec {
    /// Single column. Textual columns also get the `_like` index.
    Column(String),
    /// Multiple columns; unique when the model declares the same group in
    /// `unique_together`.
    Columns(Vec<String>),
}

impl IndexSpec {
    /// Shorthand for a single-column spec.
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    /// Shorthand for a multi-column spec.
    pub fn columns(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Columns(names.into_iter().map(Into::into).collect())
    }
}

/// A map from qualified model names to extra indices to maintain.
///
/// Entries referencing unknown columns are skipped with a warning rather
/// than failing the run.
#[derive(Debug, Clone, Default)]
pub struct CustomIndexRegistry {
    entries: IndexMap<String, Vec<IndexSpec>>,
}

impl CustomIndexRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extra index for a model.
    pub fn add(&mut self, model: impl Into<String>, spec: IndexSpec) {
        self.entries.entry(model.into()).or_default().push(spec);
    }

    /// Whether no extra indices are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The deterministic names this registry maintains for a model. Used
    /// by the deprecated-index sweep so registry indices are never treated
    /// as stale.
    pub fn expected_names(&self, model: &ModelDef) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for spec in self.entries.get(&model.name).map_or(&[][..], Vec::as_slice) {
            match spec {
                IndexSpec::Column(column) => {
                    let Some(field) = model.field_by_column(column) else {
                        continue;
                    };
                    names.insert(naming::index_name(&model.table, &[column], false));
                    if field.kind.is_textual() {
                        names.insert(naming::like_index_name(&model.table, column));
                    }
                }
                IndexSpec::Columns(columns) => {
                    if columns.iter().any(|c| !model.has_column(c)) {
                        continue;
                    }
                    let unique = model.has_unique_together(columns);
                    let mut sorted: Vec<&str> = columns.iter().map(String::as_str).collect();
                    sorted.sort_unstable();
                    names.insert(naming::index_name(&model.table, &sorted, unique));
                }
            }
        }
        names
    }

    /// Ensure every registered index for the model exists. Returns the set
    /// of index names touched.
    pub async fn apply(
        &self,
        driver: &dyn SchemaDriver,
        model: &ModelDef,
        outcome: &mut MigrationOutcome,
    ) -> MigrateResult<BTreeSet<String>> {
        let mut touched = BTreeSet::new();
        let table = &model.table;

        for spec in self.entries.get(&model.name).map_or(&[][..], Vec::as_slice) {
            match spec {
                IndexSpec::Column(column) => {
                    let Some(field) = model.field_by_column(column) else {
                        warn!(model = %model.name, column = %column, "Skipping custom index on unknown column");
                        continue;
                    };
                    let name = naming::index_name(table, &[column], false);
                    if !driver.index_exists(&name).await? {
                        driver.create_index(table, &[column.clone()], false).await?;
                        outcome.indices_created += 1;
                    }
                    touched.insert(name);

                    if field.kind.is_textual() {
                        let like = naming::like_index_name(table, column);
                        if !driver.index_exists(&like).await? {
                            driver.create_like_index(table, column, &field.kind).await?;
                            outcome.indices_created += 1;
                        }
                        touched.insert(like);
                    }
                }
                IndexSpec::Columns(columns) => {
                    if let Some(unknown) = columns.iter().find(|c| !model.has_column(c.as_str())) {
                        warn!(model = %model.name, column = %unknown, "Skipping custom index on unknown column");
                        continue;
                    }
                    let unique = model.has_unique_together(columns);
                    let mut sorted: Vec<String> = columns.clone();
                    sorted.sort_unstable();
                    let sorted_refs: Vec<&str> = sorted.iter().map(String::as_str).collect();
                    let name = naming::index_name(table, &sorted_refs, unique);
                    if !driver.index_exists(&name).await? {
                        driver.create_index(table, &sorted, unique).await?;
                        outcome.indices_created += 1;
                    }
                    touched.insert(name);
                }
            }
        }

        Ok(touched)
    }
}
