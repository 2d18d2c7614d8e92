//! Roster configuration
//!
//! Layered, lowest to highest: built-in defaults, `~/.roster/config.toml`
//! (or an explicit path), then environment variables. CLI flags are applied
//! on top by the binary.
//!
//! Environment variables:
//!   DATABASE_URL                  # PostgreSQL connection string
//!   ROSTER_HOST / ROSTER_PORT     # Bind address
//!   ROSTER_MAX_CONNECTIONS        # Pool size
//!   ROSTER_REQUEST_TIMEOUT_SECS   # Per-request timeout

use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: IpAddr,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Allow any CORS origin (default: localhost only)
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            request_timeout_secs: 30,
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    /// Attempts at the initial connection before giving up
    pub connect_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/roster".to_string(),
            max_connections: 5,
            connect_attempts: 5,
            retry_delay_secs: 3,
        }
    }
}

impl RosterConfig {
    /// Load defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Default config file path: ~/.roster/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".roster/config.toml")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).context("Failed to parse config file (invalid TOML)")
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(host) = lookup("ROSTER_HOST") {
            self.server.host = host
                .parse()
                .with_context(|| format!("ROSTER_HOST: {:?} is not an IP address", host))?;
        }
        if let Some(port) = lookup("ROSTER_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("ROSTER_PORT: {:?} is not a port", port))?;
        }
        if let Some(n) = lookup("ROSTER_MAX_CONNECTIONS") {
            self.database.max_connections = n
                .parse()
                .with_context(|| format!("ROSTER_MAX_CONNECTIONS: {:?} is not a number", n))?;
        }
        if let Some(secs) = lookup("ROSTER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = secs.parse().with_context(|| {
                format!("ROSTER_REQUEST_TIMEOUT_SECS: {:?} is not a number", secs)
            })?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.database.retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let config = RosterConfig::default();
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database.connect_attempts, 5);
        assert_eq!(config.retry_delay(), Duration::from_secs(3));
        assert!(!config.server.cors_permissive);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[database]\nurl = \"postgres://db/school\""
        )
        .unwrap();

        let config = RosterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.database.url, "postgres://db/school");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(RosterConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = RosterConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn env_overrides_file() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://env/roster"),
            ("ROSTER_HOST", "0.0.0.0"),
            ("ROSTER_PORT", "3030"),
        ]);
        let mut config = RosterConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.database.url, "postgres://env/roster");
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3030");
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut config = RosterConfig::default();
        let err = config
            .apply_env(|key| (key == "ROSTER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ROSTER_PORT"));
    }
}
