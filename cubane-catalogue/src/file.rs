//! Catalogue files: TOML descriptions of declared models.

use serde::Deserialize;

use crate::catalogue::Catalogue;
use crate::error::CatalogueResult;
use crate::model::ModelDef;

/// Top-level shape of a catalogue file.
#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(rename = "model", default)]
    models: Vec<ModelDef>,
}

impl Catalogue {
    /// Parse a catalogue from TOML text and validate it.
    ///
    /// The file format mirrors the programmatic API: a list of `[[model]]`
    /// tables, each with `[[model.field]]` entries, optional
    /// `unique_together` groups and an optional `[model.fts]` table.
    pub fn from_toml_str(text: &str) -> CatalogueResult<Self> {
        let file: CatalogueFile = toml::from_str(text)?;
        let mut catalogue = Catalogue::new();
        for model in file.models {
            catalogue.add_model(model)?;
        }
        catalogue.validate()?;
        Ok(catalogue)
    }
}
