//! CLI module
//!
//! - `serve`: HTTP API over a shared cache
//! - `ask`: answer one query and exit

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Multi-level response cache in front of an LLM
#[derive(Debug, Parser)]
#[command(name = "layered-response-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Answer a single query, generating on a miss
    Ask(ask::AskArgs),
}

/// Load `.env` and layered configuration, then install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
