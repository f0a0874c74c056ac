//! jot CLI - a live notes screen for the terminal
//!
//! Every command mounts the same sync controller the interactive shell uses,
//! so one-shot edits go through the store exactly like screen intents do.

mod cli;
mod commands;
mod config;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::commands::add::run_add;
use crate::commands::completions::run_completions;
use crate::commands::config::{run_config_init, run_config_show};
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::shell::run_shell;
use crate::commands::watch::run_watch;
use crate::config::{default_config_path, CliConfig, Overrides};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("jot=info,jot_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let file_config = CliConfig::load_from_path(&config_path).map_err(CliError::Config)?;
    let settings = file_config.resolve(
        Overrides {
            db_path: cli.db_path,
            collection: cli.collection,
        },
        |key| std::env::var(key).ok(),
    );
    tracing::debug!("Resolved settings: {settings:?}");

    match cli.command {
        Commands::List { json } => run_list(json, &settings).await?,
        Commands::Add { content } => run_add(&content, &settings).await?,
        Commands::Edit { id, content } => run_edit(&id, &content, &settings).await?,
        Commands::Delete { id, yes } => run_delete(&id, yes, &settings).await?,
        Commands::Watch { interval_ms } => run_watch(interval_ms, &settings).await?,
        Commands::Shell => run_shell(&settings).await?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => run_config_show(&settings)?,
            ConfigCommands::Init { force } => run_config_init(&config_path, &settings, force)?,
        },
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
