//! The catalogue of declared models.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{CatalogueError, CatalogueResult};
use crate::model::{FTS_COLUMN_PREFIX, ModelDef};

/// An ordered collection of declared models.
///
/// Iteration order is declaration order; [`Catalogue::in_dependency_order`]
/// yields a foreign-key-topological ordering for table creation.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    models: IndexMap<String, ModelDef>,
}

impl Catalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model. Fails on duplicate model or table names.
    pub fn add_model(&mut self, model: ModelDef) -> CatalogueResult<()> {
        if self.models.contains_key(&model.name) {
            return Err(CatalogueError::DuplicateModel(model.name));
        }
        if let Some(existing) = self.model_by_table(&model.table) {
            return Err(CatalogueError::DuplicateTable {
                first: existing.name.clone(),
                second: model.name,
                table: existing.table.clone(),
            });
        }
        debug!(model = %model.name, table = %model.table, "Adding model to catalogue");
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Number of declared models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up a model by qualified name.
    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.models.get(name)
    }

    /// Look up a model by table name.
    pub fn model_by_table(&self, table: &str) -> Option<&ModelDef> {
        self.models.values().find(|m| m.table == table)
    }

    /// Iterate models in declaration order.
    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.models.values()
    }

    /// All declared table names, in declaration order.
    pub fn table_names(&self) -> Vec<&str> {
        self.models.values().map(|m| m.table.as_str()).collect()
    }

    /// Models ordered so that foreign-key targets come before the models
    /// referencing them. Cycles are broken by falling back to declaration
    /// order for the members of the cycle; FK constraints are created
    /// separately from tables, so a cyclic graph still migrates.
    pub fn in_dependency_order(&self) -> Vec<&ModelDef> {
        let mut ordered = Vec::with_capacity(self.models.len());
        let mut visited: HashSet<&str> = HashSet::new();

        for model in self.models.values() {
            self.visit(model, &mut visited, &mut ordered);
        }

        ordered
    }

    fn visit<'a>(
        &'a self,
        model: &'a ModelDef,
        visited: &mut HashSet<&'a str>,
        ordered: &mut Vec<&'a ModelDef>,
    ) {
        if !visited.insert(model.name.as_str()) {
            return;
        }
        for table in model.referenced_tables() {
            if let Some(target) = self.model_by_table(table)
                && target.name != model.name
            {
                self.visit(target, visited, ordered);
            }
        }
        ordered.push(model);
    }

    /// Validate cross-references: every FK target is a declared table,
    /// every unique-together and FTS source column exists on its model,
    /// fields are not declared twice, and FTS generated columns carry the
    /// `fts_` prefix.
    pub fn validate(&self) -> CatalogueResult<()> {
        for model in self.models.values() {
            let mut seen = HashSet::new();
            for field in &model.fields {
                if !seen.insert(field.column_name()) {
                    return Err(CatalogueError::DuplicateField {
                        model: model.name.clone(),
                        field: field.column_name().to_string(),
                    });
                }
                if let Some(target) = field.fk_target()
                    && self.model_by_table(target).is_none()
                {
                    return Err(CatalogueError::UnknownForeignKeyTarget {
                        model: model.name.clone(),
                        field: field.name.clone(),
                        target: target.to_string(),
                    });
                }
            }

            for group in &model.unique_together {
                for column in group {
                    if !model.has_column(column) {
                        return Err(CatalogueError::UnknownColumn {
                            model: model.name.clone(),
                            column: column.clone(),
                        });
                    }
                }
            }

            if let Some(fts) = &model.fts {
                for (column, sources) in &fts.groups {
                    if !column.starts_with(FTS_COLUMN_PREFIX) {
                        return Err(CatalogueError::InvalidFtsColumn {
                            model: model.name.clone(),
                            column: column.clone(),
                        });
                    }
                    for source in sources {
                        if !model.has_column(source) {
                            return Err(CatalogueError::UnknownColumn {
                                model: model.name.clone(),
                                column: source.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
