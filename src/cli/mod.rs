//! CLI module for kb-ops
//!
//! Provides two subcommands:
//! - `clean`: delete every knowledge base (and its data sources) in a region
//! - `provision`: build a demo knowledge base and agent end to end

pub mod clean;
pub mod provision;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Printed when Ctrl-C stops a run part way
pub const INTERRUPTED_MESSAGE: &str = "Operation interrupted by user. \
     Some deletions may have completed. Re-run the command to continue.";

pub const INTERRUPTED_EXIT_CODE: i32 = 1;

/// kb-ops - bulk operations on AWS Bedrock knowledge bases and agents
#[derive(Parser, Debug)]
#[command(name = "kb-ops")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete all knowledge bases and their data sources
    Clean(clean::CleanArgs),

    /// Create a collection, vector index, knowledge base and agent, then query it
    Provision(provision::ProvisionArgs),
}

/// Dispatch a parsed command
pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Clean(args) => clean::run(args).await,
        Command::Provision(args) => provision::run(args).await,
    }
}

/// Loads `.env` and the layered configuration, then installs the subscriber
fn bootstrap(debug: bool) -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();

    logging::init_logging(
        &logging::LoggingConfig::new(config.logging.level.clone(), config.logging.format.clone())
            .with_debug(debug),
    );

    config
}
