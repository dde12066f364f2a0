//! Configuration loading and representation.
//!
//! Everything comes from environment variables; missing or unparseable
//! optional values fall back to defaults.

use std::time::Duration;

use thiserror::Error;

const DEFAULT_ENV: &str = "development";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 0;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown DATA_BACKEND value: {0}")]
    UnknownBackend(String),

    #[error("DATABASE_URL is required when DATA_BACKEND=postgres")]
    MissingDatabaseUrl,
}

/// Which quote store the process runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataBackend {
    #[default]
    Memory,
    Postgres,
}

impl core::str::FromStr for DataBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(DataBackend::Memory),
            "postgres" => Ok(DataBackend::Postgres),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Connection pool settings for the relational store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Pool settings with defaults for everything but the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Environment name (`development`, `staging`, `production`, ...).
    pub env: String,
    pub data_backend: DataBackend,
    /// Present iff `data_backend` is `Postgres`.
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let env = get("APP_ENV").unwrap_or_else(|| DEFAULT_ENV.to_string());
        let data_backend = match get("DATA_BACKEND") {
            Some(raw) => raw.parse()?,
            None => DataBackend::default(),
        };

        let database = match data_backend {
            DataBackend::Memory => None,
            DataBackend::Postgres => {
                let url = get("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;
                let secs = |key: &str, default: Duration| {
                    get(key)
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(default)
                };
                let count = |key: &str, default: u32| {
                    get(key).and_then(|v| v.parse::<u32>().ok()).unwrap_or(default)
                };

                Some(DatabaseConfig {
                    url,
                    max_connections: count("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
                    min_connections: count("DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS),
                    acquire_timeout: secs("DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT),
                    max_lifetime: secs("DB_MAX_LIFETIME_SECS", DEFAULT_MAX_LIFETIME),
                    idle_timeout: secs("DB_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT),
                })
            }
        };

        Ok(Self {
            env,
            data_backend,
            database,
        })
    }
}
