pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use error::AppError;
use commands::{indexing_commands, search_commands};
use state::AppState;

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn render_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", render_json(value)?);
    Ok(())
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let state = AppState::from_config(cli.config)?;

    match cli.command {
        Command::Index => {
            let report = indexing_commands::start_indexing(&state).await?;
            if cli.json {
                print_json(&report)?;
            } else {
                println!("{}", cli::format_report(&report));
            }
        }
        Command::Search { keyword, limit } => {
            let paths = search_commands::search(&state, &keyword, limit).await?;
            if cli.json {
                print_json(&paths)?;
            } else {
                println!("{}", cli::format_paths(&keyword, &paths));
            }
        }
        Command::Listen { audio } => {
            let result = search_commands::search_by_voice(&state, audio).await?;
            for notice in result.notices() {
                eprintln!("{}", cli::format_notice(&notice));
            }
            if cli.json {
                print_json(&result)?;
            } else {
                println!("{}", cli::format_slots(&result));
            }
        }
        Command::Status => {
            let status = indexing_commands::get_index_status(&state).await?;
            if cli.json {
                print_json(&status)?;
            } else {
                println!("{}", cli::format_status(&status));
            }
        }
    }

    Ok(())
}
