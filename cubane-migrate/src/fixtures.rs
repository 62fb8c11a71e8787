//! The fixture-loading seam.
//!
//! Fixtures are an external collaborator: after a successful commit the
//! reconciler offers every model whose table is empty to the configured
//! loader. The CLI ships a TOML-backed implementation; hosts embedding the
//! reconciler provide their own.

use async_trait::async_trait;
use cubane_catalogue::ModelDef;

use crate::driver::SchemaDriver;
use crate::error::MigrateResult;

/// Loads per-model seed data after a successful commit.
#[async_trait]
pub trait FixtureLoader: Send + Sync {
    /// Load seed rows for one model. Returns the number of rows inserted;
    /// models without fixture data return 0.
    async fn load(&self, driver: &dyn SchemaDriver, model: &ModelDef) -> MigrateResult<usize>;
}

/// A loader that loads nothing. Useful as an explicit placeholder.
pub struct NoFixtures;

#[async_trait]
impl FixtureLoader for NoFixtures {
    async fn load(&self, _driver: &dyn SchemaDriver, _model: &ModelDef) -> MigrateResult<usize> {
        Ok(0)
    }
}
