//! roster CLI - teacher/student roster API
//!
//! - `serve`: run the HTTP API (PostgreSQL or in-memory store)
//! - `migrate`: create the roster schema

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "roster",
    author,
    version,
    about = "Teacher/student roster API",
    long_about = "Register students under teachers, suspend students, and work out \
                  who receives a teacher's notification."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::ServeArgs),
    /// Create the database schema
    Migrate(commands::MigrateArgs),
}

/// Load `~/.roster/.env` then `./.env`; existing variables win.
///
/// Returns the files that were read.
fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    if let Some(home) = dirs::home_dir() {
        let path = home.join(".roster/.env");
        if dotenvy::from_path(&path).is_ok() {
            loaded.push(path);
        }
    }
    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }
    loaded
}

#[tokio::main]
async fn main() -> Result<()> {
    // before tracing so RUST_LOG from .env applies
    let env_files = load_dotenv();
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();
    for path in &env_files {
        tracing::debug!("loaded environment file {}", path.display());
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
    }
    Ok(())
}
