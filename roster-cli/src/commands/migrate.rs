//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use roster_server::db::migrations;

use super::{connect, ConfigArgs};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Create the roster tables if they are missing.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = args.config.load()?;

    let pool = connect(&config).await?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Schema is up to date");
    Ok(())
}
