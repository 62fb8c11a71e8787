//! # cubane-migrate
//!
//! Schema reconciler for the Cubane migrator.
//!
//! This crate provides functionality for:
//! - Diffing a declared [model catalogue](cubane_catalogue::Catalogue)
//!   against the live database catalogue
//! - Creating, renaming and updating tables and columns with minimal user
//!   interaction (rename-vs-add questions, one final apply confirmation)
//! - Maintaining btree, unique, prefix-match and full-text indices under
//!   deterministic names
//! - Maintaining foreign-key constraints
//! - Installing and removing full-text-search generated columns and the
//!   triggers that keep them current
//! - Wrapping the entire run in a single transaction held by the driver
//!
//! ## Architecture
//!
//! The reconciler never issues SQL itself; everything goes through the
//! [`SchemaDriver`] trait, whose reference implementation lives in
//! `cubane-postgres`. Prompting is injected the same way so the engine can
//! run scripted in tests and fully non-interactive in deployments.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │  Catalogue   │────▶│    Reconciler    │────▶│ SchemaDriver │
//! └──────────────┘     └──────────────────┘     └─────────────┘
//!                              │                       │
//!                              ▼                       ▼
//!                       ┌────────────┐          ┌─────────────┐
//!                       │  Prompter  │          │  live DB    │
//!                       └────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cubane_catalogue::{Catalogue, FieldDef, FieldKind, ModelDef};
//! use cubane_migrate::{NonInteractivePrompter, Reconciler};
//! use cubane_postgres::PgDriver;
//!
//! async fn migrate() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut catalogue = Catalogue::new();
//!     catalogue.add_model(
//!         ModelDef::new("Part", "part")
//!             .field(FieldDef::serial_pk("id"))
//!             .field(FieldDef::new("partno", FieldKind::Varchar { max_length: 16 }).indexed()),
//!     )?;
//!
//!     let driver = PgDriver::connect("postgresql://localhost/shop").await?;
//!     let prompter = NonInteractivePrompter;
//!
//!     let outcome = Reconciler::new(&driver, &prompter).run(&catalogue).await?;
//!     println!("{}", outcome.summary());
//!     Ok(())
//! }
//! ```
//!
//! The run is atomic: answering "no" at the final confirmation (or any
//! driver error) rolls the transaction back and leaves the live schema
//! untouched.

pub mod content_types;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod fts;
pub mod naming;
pub mod outcome;
pub mod prompt;
pub mod reconciler;
pub mod registry;

// Re-exports
pub use content_types::{ContentTypeTable, RenameObserver};
pub use driver::{
    ColumnDefault, ForeignKey, SchemaDriver, TypeChange, classify_type_change, defaults_equal,
    effective_default, quote_value,
};
pub use error::{MigrateError, MigrateResult};
pub use fixtures::FixtureLoader;
pub use fts::FtsChange;
pub use outcome::MigrationOutcome;
pub use prompt::{ConsolePrompter, NonInteractivePrompter, Prompter, RenameDecision};
pub use reconciler::{MigrateOptions, Reconciler};
pub use registry::{CustomIndexRegistry, IndexSpec};
