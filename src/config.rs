use std::str::FromStr;
use thiserror::Error;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite:data/beenthere.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Service settings, sourced from the environment (and `.env`, if loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub feed_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Unset variables fall back to
    /// defaults; set-but-unparseable ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            server_port: setting(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            database_url: setting(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL.to_string())?,
            max_connections: setting(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            feed_capacity: setting(&lookup, "FEED_CAPACITY", DEFAULT_FEED_CAPACITY)?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }
        if config.feed_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "FEED_CAPACITY",
                value: "0".to_string(),
            });
        }
        Ok(config)
    }
}

fn setting<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Display,
{
    match lookup(name) {
        Some(value) => {
            tracing::info!(key = name, value = %value, "using env variable");
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { name, value })
        }
        None => {
            tracing::info!(key = name, value = %default, "using default setting");
            Ok(default)
        }
    }
}
