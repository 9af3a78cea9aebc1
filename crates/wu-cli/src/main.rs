use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wu_cli::commands::report::ReportOptions;
use wu_cli::commands::{query, report, run, status};
use wu_cli::{Cli, Commands, Config};

/// Load config, ensuring the database's parent directory exists.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries query responses
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Run { input }) => {
            let config = load_config(cli.config.as_deref())?;
            run::run(&config, input.as_deref())?;
        }
        Some(Commands::Report {
            date,
            domain,
            days,
            all,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let options = ReportOptions {
                date: *date,
                domain: domain.clone(),
                days: *days,
                all: *all,
                json: *json,
            };
            report::run(&mut std::io::stdout().lock(), &config, &options)?;
        }
        Some(Commands::Query) => {
            let config = load_config(cli.config.as_deref())?;
            query::run(&mut std::io::stdout().lock(), &config)?;
        }
        Some(Commands::Status) => {
            let config = load_config(cli.config.as_deref())?;
            status::run(&mut std::io::stdout().lock(), &config)?;
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
