//! CLI module for the content ops dashboard
//!
//! - `serve`: run the dashboard JSON API
//! - `query`: run one capability against the data service and print JSON

pub mod query;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Content ops dashboard - analytics and content management over a hosted database
#[derive(Parser)]
#[command(name = "content-ops-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the dashboard API server
    Serve,

    /// Fetch a single capability and print it as JSON
    Query(query::QueryArgs),
}

/// Load `.env`, layered configuration and logging shared by every command
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;
    config.validate()?;

    debug!(
        data_service = %config.data_service.url,
        stale_policy = ?config.cache.stale_policy,
        "Configuration loaded"
    );

    Ok(config)
}
