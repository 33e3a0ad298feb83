use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fdt_cli::commands::{duty, export, import, init, log, report, status, trips};
use fdt_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(fdt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = fdt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Init { label }) => {
            init::run(label.as_deref())?;
        }
        Some(Commands::Log(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            log::run(&mut db, args)?;
        }
        Some(Commands::Status { json, at }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&db, &config, *json, at.as_deref())?;
        }
        Some(Commands::Duty { action }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            duty::run(db, &config, action)?;
        }
        Some(Commands::Report { days }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            report::run(&db, *days)?;
        }
        Some(Commands::Trips) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            trips::run(&db)?;
        }
        Some(Commands::Export) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            export::run(&mut writer, &db)?;
        }
        Some(Commands::Import) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            import::run(&mut db)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
