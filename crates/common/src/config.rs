//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Real-time connection configuration.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Voting defaults.
    #[serde(default)]
    pub voting: VotingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Ceilings for live WebSocket connections.
///
/// Exceeding either ceiling refuses the connection with an overloaded
/// close code rather than an error frame.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum live connections across all events and pools.
    #[serde(default = "default_global_connections")]
    pub max_connections: u32,
    /// Maximum live connections in one pool of one event.
    #[serde(default = "default_per_event_connections")]
    pub max_per_event: u32,
}

/// Voting defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Default countdown length in seconds for new events.
    #[serde(default = "default_duration_sec")]
    pub default_duration_sec: i32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_global_connections() -> u32 {
    10_000
}

const fn default_per_event_connections() -> u32 {
    2_000
}

const fn default_duration_sec() -> i32 {
    15
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections: default_global_connections(),
            max_per_event: default_per_event_connections(),
        }
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            default_duration_sec: default_duration_sec(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `VOTEHALL_ENV`)
    /// 3. Environment variables with `VOTEHALL_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("VOTEHALL_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VOTEHALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("VOTEHALL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                url = "http://localhost:8000"

                [database]
                url = "postgres://localhost/votehall"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.realtime.max_per_event, 2_000);
        assert_eq!(config.voting.default_duration_sec, 15);
    }
}
