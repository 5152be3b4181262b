//! Checkin CLI - scan attendees in from the terminal
//!
//! Works against the local roster cache and syncs with the event API.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::check_in::{run_check_in, run_scan};
use crate::commands::clear_cache::run_clear_cache;
use crate::commands::common::{resolve_db_path, resolve_event};
use crate::commands::completions::run_completions;
use crate::commands::load::run_load;
use crate::commands::run::run_session;
use crate::commands::search::run_search;
use crate::commands::status::run_status;
use crate::commands::sync::{run_pull, run_push};
use crate::error::CliError;

#[tokio::main]
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
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("checkin=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let event = resolve_event(cli.event)?;
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Load => run_load(&event, &db_path).await?,
        Commands::Scan { payload } => run_scan(&payload, &event, &db_path).await?,
        Commands::CheckIn { id } => run_check_in(id, &event, &db_path).await?,
        Commands::Push => run_push(&event, &db_path).await?,
        Commands::Pull => run_pull(&event, &db_path).await?,
        Commands::Search { query, limit, json } => {
            run_search(query.as_deref(), limit, json, &event, &db_path).await?;
        }
        Commands::Status { json } => run_status(json, &event, &db_path).await?,
        Commands::Run => run_session(&event, &db_path).await?,
        Commands::ClearCache => run_clear_cache(&event, &db_path).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
