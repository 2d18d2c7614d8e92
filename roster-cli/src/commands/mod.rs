//! Subcommand implementations

pub mod migrate;
pub mod serve;

pub use migrate::{run_migrate, MigrateArgs};
pub use serve::{run_serve, ServeArgs};

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use roster_core::RosterConfig;
use roster_server::{connect_with_retry, PgPool};

/// Options shared by every subcommand that reads configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file (default: ~/.roster/config.toml if present)
    #[arg(long, short = 'c', env = "ROSTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

impl ConfigArgs {
    /// Layer config file and environment, then these flags on top.
    pub fn load(&self) -> Result<RosterConfig> {
        let mut config = RosterConfig::load(self.config.as_deref())?;
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        Ok(config)
    }
}

/// Connect to PostgreSQL using the configured retry policy.
async fn connect(config: &RosterConfig) -> Result<PgPool> {
    let db = &config.database;
    connect_with_retry(
        &db.url,
        db.max_connections,
        db.connect_attempts,
        config.retry_delay(),
    )
    .await
    .context("Failed to connect to database")
}
