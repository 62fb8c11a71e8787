//! # cubane-catalogue
//!
//! The declared-model catalogue for the Cubane schema migrator.
//!
//! A [`Catalogue`] is an in-memory enumeration of the entities a host
//! application declares: for each model its table name, its ordered fields
//! (column name, kind, nullability, default, indexing), its
//! unique-together groups, and an optional full-text-search specification.
//! The migrator compares this catalogue against the live database and
//! reconciles the two; the catalogue itself never talks to a database.
//!
//! ## Building a catalogue
//!
//! ```rust
//! use cubane_catalogue::{Catalogue, FieldDef, FieldKind, ModelDef};
//!
//! let mut catalogue = Catalogue::new();
//! catalogue.add_model(
//!     ModelDef::new("Part", "part")
//!         .field(FieldDef::serial_pk("id"))
//!         .field(FieldDef::new("partno", FieldKind::Varchar { max_length: 16 }).indexed())
//!         .field(FieldDef::new("name", FieldKind::Text).nullable()),
//! )?;
//! catalogue.validate()?;
//! # Ok::<(), cubane_catalogue::CatalogueError>(())
//! ```
//!
//! ## Catalogue files
//!
//! Hosts that do not want to build the catalogue programmatically can
//! describe it in TOML and load it with [`Catalogue::from_toml_str`]:
//!
//! ```toml
//! [[model]]
//! name = "Part"
//! table = "part"
//!
//! [[model.field]]
//! name = "id"
//! kind = "int"
//! primary_key = true
//!
//! [[model.field]]
//! name = "partno"
//! kind = "varchar(16)"
//! indexed = true
//! ```

pub mod catalogue;
pub mod error;
pub mod field;
pub mod file;
pub mod model;
pub mod value;

// Re-exports
pub use catalogue::Catalogue;
pub use error::{CatalogueError, CatalogueResult};
pub use field::{FieldDef, FieldKind};
pub use model::{FTS_COLUMN_PREFIX, FtsSpec, ModelDef};
pub use value::Value;
