//! Popo CLI entrypoint.

use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod handlers;


use commands::{Commands, ConfigCommands};
use config::AppConfig;
use popo_core::ports::SystemClock;

#[derive(Parser)]
#[command(name = "popo")]
#[command(author, version, about = "Popocatépetl bulletin scraper and query API", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "POPO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::config_path()?,
    };
    let config = AppConfig::load(Some(&config_path))?;

    popo_trace::init_tracer(&config.tracing)?;

    let clock = SystemClock;
    let outcome = match cli.command.unwrap_or(Commands::Latest { json: true }) {
        Commands::Serve { bind } => handlers::serve(&config, bind).await,
        Commands::Latest { json } => handlers::latest(&config, &clock, json).await,
        Commands::Alert { date } => handlers::alert(&config, &clock, date.as_deref()).await,
        Commands::Get { date, field, json } => {
            handlers::get(&config, &date, field.as_deref(), json).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config, &config_path),
            ConfigCommands::Set { key, value } => handlers::set_config(&config_path, &key, &value),
            ConfigCommands::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    };

    popo_trace::shutdown_tracer();
    outcome
}
