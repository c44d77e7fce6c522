//! expunge - delete one MongoDB document by ObjectId
//!
//! Usage:
//!   expunge <ID>                          Delete using MONGO_* variables (and ./.env)
//!   expunge <ID> --env-file prod.env      Load variables from a specific file
//!   expunge <ID> --host db.internal       Override a single setting
//!   expunge <ID> --output json            Machine-readable output
//!
//! Prints the number of deleted documents (0 or 1) and exits 0, or prints the
//! error to stderr and exits 1.

mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use expunge_mongodb::{delete_document, DeleteResult, DocumentId};
use std::process::ExitCode;
use tracing::debug;

use config::{load_env_file, ConfigArgs, SettingsArgs};
use report::{OutputFormat, Reporter};

#[derive(Parser, Debug)]
#[command(name = "expunge")]
#[command(about = "Delete a single MongoDB document by ObjectId", long_about = None)]
#[command(version)]
struct Cli {
    /// ObjectId of the document to delete (24 hex characters)
    id: String,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // The env file has to be in the environment before clap reads MONGO_*,
    // so parse once for --env-file and again once it is loaded
    let env_file = load_env_file(Cli::parse().config.env_file.as_deref());
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("Warning: {:#}", e);
    }

    let outcome = match env_file {
        Ok(loaded) => {
            if let Some(path) = loaded {
                debug!(path = %path.display(), "Loaded environment file");
            }
            execute(&cli).await
        }
        Err(e) => Err(e),
    };

    let status = Reporter::stdio(cli.output).report(&outcome);
    ExitCode::from(status)
}

/// Checks the identifier, resolves configuration, and runs the delete
async fn execute(cli: &Cli) -> expunge_common::Result<DeleteResult> {
    DocumentId::parse(&cli.id)?;
    let config = cli.config.resolve()?;
    debug!(?config, "Resolved configuration");
    delete_document(&config, &cli.settings.to_settings(), &cli.id).await
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (filter, invalid) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(level) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("warn"), Some(e)),
        },
    };

    // Logs go to stderr; stdout carries only the deleted count
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    match invalid {
        Some(e) => Err(e).with_context(|| format!("invalid log level '{}', using 'warn'", level)),
        None => Ok(()),
    }
}
