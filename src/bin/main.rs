//! dbscribe CLI - print the schema of a database as JSON
//!
//! Usage:
//!   dbscribe [--config <file>] [--connection <name>] [--verbose]
//!
//! Without a config file the connection comes from `DBSCRIBE_DB_DRIVER`,
//! `DBSCRIBE_DB_URL` and `DBSCRIBE_DB_SCHEMA`.
//!
//! Examples:
//!   dbscribe --connection warehouse
//!   DBSCRIBE_DB_DRIVER=mongodb DBSCRIBE_DB_URL=mongodb://localhost/films dbscribe -v

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dbscribe::analysis::analyze_connection;
use dbscribe::config::{ConnectionSettings, Settings, SettingsError};
use dbscribe::worker::WorkerClient;
use tracing::Level;

#[derive(Parser)]
#[command(name = "dbscribe")]
#[command(about = "dbscribe - reverse-engineer a schema model from a live database")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $DBSCRIBE_CONFIG, ./dbscribe.toml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named connection from the settings file
    #[arg(short = 'n', long)]
    connection: Option<String>,

    /// Log progress to stderr (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let connection = match select_connection(&settings, cli.connection.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match WorkerClient::spawn_with_settings(&settings.worker).await {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Error starting worker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = match analyze_connection(client, &connection, &settings.analysis).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for diagnostic in &report.diagnostics {
        eprintln!("{:?}: {}", diagnostic.severity(), diagnostic);
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing schema: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Named connection, else the settings' default, else the environment.
fn select_connection(
    settings: &Settings,
    name: Option<&str>,
) -> Result<ConnectionSettings, SettingsError> {
    if let Some(name) = name {
        return settings.get_connection(name).cloned();
    }
    match settings.default_connection() {
        Some((_, connection)) => Ok(connection.clone()),
        None => ConnectionSettings::from_env(),
    }
}
