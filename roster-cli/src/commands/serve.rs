//! HTTP server command
//!
//! Resolves configuration, picks a store and runs the roster API until
//! Ctrl+C / SIGTERM.

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use roster_core::{MemoryStore, Roster, RosterConfig};
use roster_server::db::migrations;
use roster_server::{run_server, PgStore};

use super::{connect, ConfigArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to bind to (default: 127.0.0.1)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to bind to (default: 8080)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Keep everything in memory instead of PostgreSQL
    #[arg(long, conflicts_with = "database_url")]
    pub memory: bool,
}

impl ServeArgs {
    fn resolve(&self) -> Result<RosterConfig> {
        let mut config = self.config.load()?;
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.cors_permissive {
            config.server.cors_permissive = true;
        }
        Ok(config)
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.resolve()?;

    let roster = if args.memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        Roster::new(Arc::new(MemoryStore::new()))
    } else {
        let pool = connect(&config).await?;
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
        Roster::new(Arc::new(PgStore::new(pool)))
    };

    tracing::info!("Starting roster server on {}", config.bind_addr());

    // Blocks until shutdown
    run_server(roster, &config)
        .await
        .context("Server error")?;

    Ok(())
}
