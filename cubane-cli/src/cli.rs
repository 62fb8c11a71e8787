//! CLI argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

/// Cubane dbmigrate - reconcile declared models with the live database
#[derive(Parser, Debug)]
#[command(name = "dbmigrate")]
#[command(version)]
#[command(about = "Reconcile declared models with the live database schema", long_about = None)]
pub struct Cli {
    /// Path to the catalogue file describing declared models
    #[arg(short, long, default_value = "catalogue.toml")]
    pub catalogue: PathBuf,

    /// Database connection URL
    #[arg(short, long, env = "DATABASE_URL")]
    pub url: String,

    /// Disable all prompts: renames resolve to "added", the final apply
    /// confirmation to yes
    #[arg(long)]
    pub noinput: bool,

    /// Suppress informational output
    #[arg(long)]
    pub nooutput: bool,

    /// Skip the post-commit fixture loader
    #[arg(long)]
    pub skip_fixtures: bool,

    /// Run every decision but roll back instead of committing
    #[arg(long)]
    pub dry_run: bool,

    /// Directory with per-table fixture files
    #[arg(long, default_value = "fixtures")]
    pub fixtures_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::parse_from([
            "dbmigrate",
            "--url",
            "postgresql://localhost/shop",
            "--noinput",
            "--nooutput",
            "--skip-fixtures",
        ]);
        assert!(cli.noinput);
        assert!(cli.nooutput);
        assert!(cli.skip_fixtures);
        assert!(!cli.dry_run);
        assert_eq!(cli.catalogue, PathBuf::from("catalogue.toml"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["dbmigrate", "--url", "postgresql://localhost/shop"]);
        assert!(!cli.noinput);
        assert!(!cli.nooutput);
        assert!(!cli.skip_fixtures);
        assert_eq!(cli.fixtures_dir, PathBuf::from("fixtures"));
    }

    #[test]
    fn test_url_is_required_without_env() {
        // Guard: only meaningful when the environment doesn't provide it.
        if std::env::var_os("DATABASE_URL").is_none() {
            assert!(Cli::try_parse_from(["dbmigrate"]).is_err());
        }
    }
}
