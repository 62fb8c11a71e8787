//! The schema reconciler.
//!
//! One run walks the declared catalogue in foreign-key order and brings
//! the live schema in line with it: tables are created or renamed, columns
//! created, renamed, dropped or altered, indices and FK constraints
//! maintained, and full-text-search columns installed. Everything happens
//! inside a single transaction held by the driver; the final confirmation
//! is the only point at which the changes become visible.

use std::collections::{BTreeSet, HashSet};

use cubane_catalogue::{Catalogue, FTS_COLUMN_PREFIX, FieldDef, ModelDef};
use tracing::{debug, info};

use crate::content_types::RenameObserver;
use crate::driver::{
    SchemaDriver, TypeChange, classify_type_change, default_literal, defaults_equal,
    effective_default,
};
use crate::error::{MigrateError, MigrateResult};
use crate::fixtures::FixtureLoader;
use crate::fts::{self, FtsChange};
use crate::naming;
use crate::outcome::MigrationOutcome;
use crate::prompt::{Prompter, RenameDecision, ask_rename_field, ask_rename_table};
use crate::registry::CustomIndexRegistry;

/// Options for a migration run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Run every decision but roll back unconditionally instead of asking
    /// to commit.
    pub dry_run: bool,
    /// Invoke the fixture loader after a successful commit.
    pub load_fixtures: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            load_fixtures: true,
        }
    }
}

/// Per-run bookkeeping threaded through the steps.
#[derive(Default)]
struct RunState {
    outcome: MigrationOutcome,
    fts_changes: Vec<FtsChange>,
    /// `(old_table, new_table)` for every rename taken in step B.
    renamed_tables: Vec<(String, String)>,
}

/// The stateless coordinator: holds the collaborators, owns nothing but
/// the run.
pub struct Reconciler<'a> {
    driver: &'a dyn SchemaDriver,
    prompter: &'a dyn Prompter,
    options: MigrateOptions,
    registry: CustomIndexRegistry,
    observers: Vec<Box<dyn RenameObserver>>,
    fixtures: Option<Box<dyn FixtureLoader>>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a driver and prompter.
    pub fn new(driver: &'a dyn SchemaDriver, prompter: &'a dyn Prompter) -> Self {
        Self {
            driver,
            prompter,
            options: MigrateOptions::default(),
            registry: CustomIndexRegistry::new(),
            observers: Vec::new(),
            fixtures: None,
        }
    }

    /// Set run options.
    pub fn with_options(mut self, options: MigrateOptions) -> Self {
        self.options = options;
        self
    }

    /// Maintain caller-supplied extra indices.
    pub fn with_custom_indices(mut self, registry: CustomIndexRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Notify an observer about table renames (content-type bookkeeping).
    pub fn with_rename_observer(mut self, observer: impl RenameObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Load fixtures into empty tables after commit.
    pub fn with_fixture_loader(mut self, loader: impl FixtureLoader + 'static) -> Self {
        self.fixtures = Some(Box::new(loader));
        self
    }

    /// Run the full reconciliation.
    ///
    /// Any error rolls the transaction back and propagates; a "no" at the
    /// final confirmation rolls back cleanly and is not an error.
    pub async fn run(&self, catalogue: &Catalogue) -> MigrateResult<MigrationOutcome> {
        catalogue.validate()?;

        self.driver.begin().await?;
        let mut state = RunState::default();

        if let Err(e) = self.apply(catalogue, &mut state).await {
            let _ = self.driver.rollback().await;
            return Err(e);
        }

        let apply = if self.options.dry_run {
            false
        } else if state.outcome.has_changes() {
            self.prompter
                .ask_confirm("Apply the above changes to the database?", true)?
        } else {
            true
        };

        if !apply {
            self.driver.rollback().await?;
            info!("migration rolled back");
            return Ok(state.outcome);
        }

        self.driver.commit().await?;
        state.outcome.applied = true;
        info!(summary = %state.outcome.summary(), "migration committed");

        if !state.fts_changes.is_empty() {
            let reindex = self
                .prompter
                .ask_confirm("Full-text search columns changed. Rebuild them now?", true)?;
            if reindex {
                for change in &state.fts_changes {
                    self.driver
                        .fts_index(&change.table, &change.column, &change.sources)
                        .await?;
                    state.outcome.fts_reindexed += 1;
                }
            }
        }

        if self.options.load_fixtures
            && let Some(loader) = &self.fixtures
        {
            for model in catalogue.models() {
                if self.driver.table_is_empty(&model.table).await? {
                    state.outcome.fixtures_loaded += loader.load(self.driver, model).await?;
                }
            }
        }

        Ok(state.outcome)
    }

    /// Steps A-F, all inside the transaction.
    async fn apply(&self, catalogue: &Catalogue, state: &mut RunState) -> MigrateResult<()> {
        // Step A: lock every declared table already present. New tables
        // are locked as they are created.
        self.lock_existing(catalogue).await?;

        // Step B: create or rename tables, referenced models first.
        self.create_or_rename_tables(catalogue, state).await?;

        // Step C: reconcile columns, constraints and field indices.
        for model in catalogue.models() {
            self.update_table(model, state).await?;
        }

        // Step D: caller-supplied extra indices.
        for model in catalogue.models() {
            self.registry
                .apply(self.driver, model, &mut state.outcome)
                .await?;
        }

        // Step E: content-type bookkeeping for renamed models.
        for (old, new) in &state.renamed_tables {
            if let Some(model) = catalogue.model_by_table(new) {
                for observer in &self.observers {
                    observer.table_renamed(self.driver, model, old).await?;
                }
            }
        }

        // Step F: full-text search.
        for model in catalogue.models() {
            let changes = fts::install(self.driver, model, &mut state.outcome).await?;
            state.fts_changes.extend(changes);
        }

        Ok(())
    }

    async fn lock_existing(&self, catalogue: &Catalogue) -> MigrateResult<()> {
        let live = self.driver.get_table_names().await?;
        let tables: Vec<String> = catalogue
            .models()
            .map(|m| m.table.clone())
            .filter(|t| live.contains(t))
            .collect();
        if !tables.is_empty() {
            self.driver.lock(&tables).await?;
        }
        Ok(())
    }

    /// Step B. Declared tables missing from the live catalogue are either
    /// created or renamed from an unclaimed live table, at the user's
    /// choice.
    async fn create_or_rename_tables(
        &self,
        catalogue: &Catalogue,
        state: &mut RunState,
    ) -> MigrateResult<()> {
        let declared: HashSet<&str> = catalogue.table_names().into_iter().collect();

        for model in catalogue.in_dependency_order() {
            if self.driver.table_exists(&model.table).await? {
                continue;
            }

            let live = self.driver.get_table_names().await?;
            let candidates: Vec<String> = live
                .iter()
                .filter(|t| !declared.contains(t.as_str()))
                .cloned()
                .collect();

            let decision = if candidates.is_empty() {
                RenameDecision::Added
            } else {
                ask_rename_table(self.prompter, &model.table, &candidates)?
            };

            match decision {
                RenameDecision::Added => {
                    debug!(table = %model.table, "Creating table");
                    self.driver.create_table(model).await?;
                    self.driver.lock(&[model.table.clone()]).await?;
                    state.outcome.tables_created += 1;
                }
                RenameDecision::RenamedFrom(previous) => {
                    debug!(from = %previous, to = %model.table, "Renaming table");
                    self.driver.rename_table(&previous, &model.table).await?;
                    self.rename_owned_indices(&previous, model, state).await?;
                    self.driver.lock(&[model.table.clone()]).await?;
                    state
                        .renamed_tables
                        .push((previous, model.table.clone()));
                    state.outcome.tables_renamed += 1;
                }
            }
        }
        Ok(())
    }

    /// Carry owned indices across a table rename so the deprecated sweep
    /// does not orphan them under the old prefix.
    async fn rename_owned_indices(
        &self,
        old_table: &str,
        model: &ModelDef,
        state: &mut RunState,
    ) -> MigrateResult<()> {
        let columns: HashSet<String> = self
            .driver
            .get_column_names(&model.table)
            .await?
            .into_iter()
            .collect();

        for name in self.driver.get_indices(&model.table).await? {
            if let Some(new_name) =
                naming::renamed_index_name(&name, old_table, &model.table, &columns)
                && new_name != name
            {
                self.driver.rename_index(&name, &new_name).await?;
                state.outcome.indices_renamed += 1;
            }
        }
        Ok(())
    }

    /// Step C for one model: C1 add-or-rename columns, C2 drop deprecated
    /// columns, C3 update fields, C4 sweep deprecated indices, C5 field
    /// indices, C6 unique-together indices.
    async fn update_table(&self, model: &ModelDef, state: &mut RunState) -> MigrateResult<()> {
        let table = &model.table;
        let mut live: Vec<String> = self.driver.get_column_names(table).await?;

        // C1: declared fields whose column is missing were either added or
        // renamed from a live column no declared field matches.
        for field in &model.fields {
            let column = field.column_name();
            if live.iter().any(|c| c == column) {
                continue;
            }

            let candidates: Vec<String> = live
                .iter()
                .filter(|c| !model.has_column(c.as_str()) && !c.starts_with(FTS_COLUMN_PREFIX))
                .cloned()
                .collect();

            let decision = if candidates.is_empty() {
                RenameDecision::Added
            } else {
                ask_rename_field(self.prompter, table, column, &candidates)?
            };

            match decision {
                RenameDecision::Added => {
                    debug!(table = %table, column = %column, "Creating column");
                    self.driver.create_column(table, field).await?;
                    live.push(column.to_string());
                    state.outcome.columns_created += 1;
                }
                RenameDecision::RenamedFrom(previous) => {
                    debug!(table = %table, from = %previous, to = %column, "Renaming column");
                    self.driver.rename_column(table, &previous, column).await?;
                    self.rename_column_indices(model, &previous, field, state)
                        .await?;
                    if let Some(slot) = live.iter_mut().find(|c| **c == previous) {
                        *slot = column.to_string();
                    }
                    state.outcome.columns_renamed += 1;
                }
            }
        }

        // C2: live columns matching no declared field are dropped, except
        // FTS generated columns which step F owns.
        for column in live.clone() {
            if column.starts_with(FTS_COLUMN_PREFIX) || model.has_column(&column) {
                continue;
            }
            debug!(table = %table, column = %column, "Dropping deprecated column");
            self.driver.drop_column(table, &column).await?;
            live.retain(|c| *c != column);
            state.outcome.columns_dropped += 1;
        }

        // C3: nullability, default, data type, foreign key.
        for field in &model.fields {
            self.update_field(model, field, state).await?;
        }

        // C4: drop owned indices no declared field or custom index
        // accounts for. Unrecognized names belong to the user.
        self.sweep_indices(model, state).await?;

        // C5: per-field indices.
        for field in &model.fields {
            self.ensure_field_indices(model, field, state).await?;
        }

        // C6: unique-together groups index the sorted column list.
        for group in &model.unique_together {
            let mut columns: Vec<String> = group.clone();
            columns.sort_unstable();
            let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
            let name = self.driver.get_index_name(table, &refs, true);
            if !self.driver.index_exists(&name).await? {
                self.driver.create_index(table, &columns, true).await?;
                state.outcome.indices_created += 1;
            }
        }

        Ok(())
    }

    /// Carry the deterministic per-column indices across a column rename.
    async fn rename_column_indices(
        &self,
        model: &ModelDef,
        previous: &str,
        field: &FieldDef,
        state: &mut RunState,
    ) -> MigrateResult<()> {
        let table = &model.table;
        let column = field.column_name();
        let pairs = [
            (
                naming::index_name(table, &[previous], false),
                naming::index_name(table, &[column], false),
            ),
            (
                naming::index_name(table, &[previous], true),
                naming::index_name(table, &[column], true),
            ),
            (
                naming::like_index_name(table, previous),
                naming::like_index_name(table, column),
            ),
        ];

        for (old, new) in pairs {
            if self.driver.index_exists(&old).await? && !self.driver.index_exists(&new).await? {
                self.driver.rename_index(&old, &new).await?;
                state.outcome.indices_renamed += 1;
            }
        }
        Ok(())
    }

    /// C3 for one field.
    async fn update_field(
        &self,
        model: &ModelDef,
        field: &FieldDef,
        state: &mut RunState,
    ) -> MigrateResult<()> {
        // Serial primary keys are managed by their sequence.
        if field.auto_increment {
            return Ok(());
        }

        let table = &model.table;
        let column = field.column_name();
        let mut altered = false;

        // Nullability. Tightening backfills NULL rows from the declared
        // default first; without one, existing NULLs are fatal.
        let live_nullable = self.driver.column_is_nullable(table, column).await?;
        if field.nullable && !live_nullable {
            self.driver.make_nullable(table, column).await?;
            altered = true;
        } else if !field.nullable && live_nullable {
            match effective_default(field) {
                Some(default) => {
                    self.driver
                        .update_null_to_default(table, column, &default)
                        .await?;
                }
                None => {
                    if self.driver.has_null_value(table, column).await? {
                        return Err(MigrateError::NullValuesExist {
                            table: table.clone(),
                            column: column.to_string(),
                        });
                    }
                }
            }
            self.driver.make_not_nullable(table, column).await?;
            altered = true;
        }

        // Default.
        let live_default = self.driver.get_column_default(table, column).await?;
        let expected = effective_default(field);
        let expected_literal = default_literal(expected.as_ref());
        if !defaults_equal(live_default.as_deref(), expected_literal.as_deref()) {
            match &expected {
                Some(default) => {
                    self.driver
                        .set_column_default(table, column, default)
                        .await?;
                }
                None => {
                    self.driver.drop_column_default(table, column).await?;
                }
            }
            altered = true;
        }

        // Data type.
        let (live_type, live_len) = self.driver.get_column_datatype(table, column).await?;
        let (want_type, want_len) = self.driver.expected_datatype(&field.kind);
        match classify_type_change(&live_type, live_len, &want_type, want_len) {
            TypeChange::None => {}
            TypeChange::Widen => {
                self.driver
                    .change_column_data_type(table, column, &field.kind)
                    .await?;
                altered = true;
            }
            TypeChange::NarrowVarchar(max_length) => {
                self.driver
                    .update_varchar_length(table, column, max_length)
                    .await?;
                self.driver
                    .change_column_data_type(table, column, &field.kind)
                    .await?;
                altered = true;
            }
            TypeChange::Unsupported => {
                return Err(MigrateError::UnsupportedTypeChange {
                    table: table.clone(),
                    column: column.to_string(),
                    from: format_type(&live_type, live_len),
                    to: format_type(&want_type, want_len),
                });
            }
        }

        // Foreign key. A constraint pointing elsewhere is replaced.
        if let Some(target) = field.fk_target() {
            if !self.driver.table_exists(target).await? {
                return Err(MigrateError::MissingReferencedTable {
                    table: table.clone(),
                    referenced: target.to_string(),
                });
            }
            if !self
                .driver
                .foreign_key_constraint_exists(table, column, target, "id")
                .await?
            {
                for fk in self.driver.foreign_keys_on(table, column).await? {
                    self.driver
                        .drop_foreign_key_constraint(table, &fk.name)
                        .await?;
                }
                self.driver
                    .create_foreign_key_constraint(table, column, target, "id")
                    .await?;
                altered = true;
            }
        }

        if altered {
            state.outcome.columns_altered += 1;
        }
        Ok(())
    }

    /// C4: drop owned indices that no longer correspond to any declared
    /// field, unique-together group, custom index or FTS group.
    async fn sweep_indices(&self, model: &ModelDef, state: &mut RunState) -> MigrateResult<()> {
        let table = &model.table;
        let expected = self.expected_index_names(model);

        let mut known_columns: HashSet<String> = self
            .driver
            .get_column_names(table)
            .await?
            .into_iter()
            .collect();
        known_columns.extend(model.column_names().into_iter().map(String::from));

        for name in self.driver.get_indices(table).await? {
            if expected.contains(&name) {
                continue;
            }
            if naming::is_owned_index(table, &name, &known_columns) {
                debug!(table = %table, index = %name, "Dropping deprecated index");
                self.driver.drop_index(table, &name).await?;
                state.outcome.indices_dropped += 1;
            }
        }
        Ok(())
    }

    /// The full set of deterministic index names the declared state
    /// accounts for on this model's table.
    fn expected_index_names(&self, model: &ModelDef) -> BTreeSet<String> {
        let table = &model.table;
        let mut names = BTreeSet::new();

        for field in &model.fields {
            if field.auto_increment {
                continue;
            }
            let column = field.column_name();
            if field.indexed || field.unique {
                names.insert(naming::index_name(table, &[column], field.unique));
                if field.indexed && field.kind.is_textual() {
                    names.insert(naming::like_index_name(table, column));
                }
            }
        }

        for group in &model.unique_together {
            let mut columns: Vec<&str> = group.iter().map(String::as_str).collect();
            columns.sort_unstable();
            names.insert(naming::index_name(table, &columns, true));
        }

        names.extend(self.registry.expected_names(model));

        if let Some(fts) = &model.fts {
            for column in fts.groups.keys() {
                names.insert(naming::fts_index_name(table, column));
            }
        }

        names
    }

    /// C5: ensure the btree (or unique) index for an indexed field, plus
    /// the `_like` index for textual fields. The stale variant of a
    /// toggled uniqueness was already dropped by the sweep.
    async fn ensure_field_indices(
        &self,
        model: &ModelDef,
        field: &FieldDef,
        state: &mut RunState,
    ) -> MigrateResult<()> {
        if field.auto_increment || !(field.indexed || field.unique) {
            return Ok(());
        }

        let table = &model.table;
        let column = field.column_name();
        let name = self.driver.get_index_name(table, &[column], field.unique);

        if !self.driver.index_exists(&name).await? {
            self.driver
                .create_index(table, &[column.to_string()], field.unique)
                .await?;
            state.outcome.indices_created += 1;
        } else if self.driver.is_index_unique(&name).await? != field.unique {
            self.driver.drop_index(table, &name).await?;
            self.driver
                .create_index(table, &[column.to_string()], field.unique)
                .await?;
            state.outcome.indices_dropped += 1;
            state.outcome.indices_created += 1;
        }

        if field.indexed && field.kind.is_textual() {
            let like = self.driver.get_like_index_name(table, column);
            if !self.driver.index_exists(&like).await? {
                self.driver
                    .create_like_index(table, column, &field.kind)
                    .await?;
                state.outcome.indices_created += 1;
            }
        }

        Ok(())
    }
}

fn format_type(name: &str, max_length: Option<u32>) -> String {
    match max_length {
        Some(n) => format!("{}({})", name, n),
        None => name.to_string(),
    }
}
