//! Declared models and their full-text-search specifications.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::FieldDef;

/// Prefix identifying generated full-text-search columns.
pub const FTS_COLUMN_PREFIX: &str = "fts_";

/// Full-text-search specification for a model: a mapping from generated
/// tsvector column names to the source columns they are built from.
///
/// Generated column names must carry the [`FTS_COLUMN_PREFIX`] so the
/// deprecated-column sweep can tell them apart from host columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FtsSpec {
    /// `generated_column -> [source_column, ...]`, in declaration order.
    #[serde(flatten)]
    pub groups: IndexMap<String, Vec<String>>,
}

impl FtsSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a generated column built from the given source columns.
    pub fn group(
        mut self,
        column: impl Into<String>,
        sources: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.groups
            .insert(column.into(), sources.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the spec declares no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A declared model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    /// Qualified model name. Identity within the catalogue.
    pub name: String,
    /// Table name in the database.
    pub table: String,
    /// Ordered fields.
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldDef>,
    /// Groups of columns that must be unique together.
    #[serde(default)]
    pub unique_together: Vec<Vec<String>>,
    /// Optional full-text-search specification.
    #[serde(default)]
    pub fts: Option<FtsSpec>,
}

impl ModelDef {
    /// Create a model with no fields.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            fields: Vec::new(),
            unique_together: Vec::new(),
            fts: None,
        }
    }

    /// Add a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a unique-together group.
    pub fn unique_together(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.unique_together
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the full-text-search specification.
    pub fn fts(mut self, spec: FtsSpec) -> Self {
        self.fts = Some(spec);
        self
    }

    /// Look up a field by its effective column name.
    pub fn field_by_column(&self, column: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.column_name() == column)
    }

    /// Whether any declared field maps to the given column.
    pub fn has_column(&self, column: &str) -> bool {
        self.field_by_column(column).is_some()
    }

    /// The effective column names of all declared fields, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_name()).collect()
    }

    /// Tables this model references through foreign keys.
    pub fn referenced_tables(&self) -> Vec<&str> {
        self.fields.iter().filter_map(|f| f.fk_target()).collect()
    }

    /// Whether a unique-together group with exactly these columns is
    /// declared (order-insensitive).
    pub fn has_unique_together(&self, columns: &[String]) -> bool {
        let mut wanted: Vec<&str> = columns.iter().map(String::as_str).collect();
        wanted.sort_unstable();
        self.unique_together.iter().any(|group| {
            let mut group: Vec<&str> = group.iter().map(String::as_str).collect();
            group.sort_unstable();
            group == wanted
        })
    }
}
