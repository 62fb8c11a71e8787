//! The `dbmigrate` command.

use cubane_catalogue::Catalogue;
use cubane_migrate::{
    ConsolePrompter, ContentTypeTable, MigrateOptions, NonInteractivePrompter, Prompter,
    Reconciler,
};
use cubane_postgres::{PgConfig, PgDriver};

use crate::cli::Cli;
use crate::error::CliResult;
use crate::fixtures::TomlFixtureLoader;
use crate::output;

/// Run the migration command.
pub async fn run(cli: Cli) -> CliResult<()> {
    output::set_quiet(cli.nooutput);

    output::header("Cubane dbmigrate");

    let config = PgConfig::from_url(&cli.url)?;
    output::kv("Catalogue", &cli.catalogue.display().to_string());
    output::kv(
        "Database",
        &format!("{}:{}/{}", config.host, config.port, config.database),
    );

    let text = std::fs::read_to_string(&cli.catalogue)?;
    let catalogue = Catalogue::from_toml_str(&text)?;
    output::kv("Models", &catalogue.len().to_string());
    output::newline();

    let driver = PgDriver::from_config(&config).await?;

    let prompter: Box<dyn Prompter> = if cli.noinput {
        Box::new(NonInteractivePrompter)
    } else {
        Box::new(ConsolePrompter)
    };

    let options = MigrateOptions {
        dry_run: cli.dry_run,
        load_fixtures: !cli.skip_fixtures,
    };

    let outcome = Reconciler::new(&driver, prompter.as_ref())
        .with_options(options)
        .with_rename_observer(ContentTypeTable::new())
        .with_fixture_loader(TomlFixtureLoader::new(&cli.fixtures_dir))
        .run(&catalogue)
        .await?;

    if outcome.applied {
        output::success(&outcome.summary());
        if outcome.fixtures_loaded > 0 {
            output::info(&format!("{} fixture rows loaded", outcome.fixtures_loaded));
        }
    } else if cli.dry_run {
        output::info(&format!("[dry run] {}", outcome.summary()));
    } else {
        output::warn(&outcome.summary());
    }

    Ok(())
}
