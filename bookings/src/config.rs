//! Configuration management for the booking server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that are present but malformed are rejected instead of silently
//! replaced by the default.

use broom_fairy_core::policy::DEFAULT_FREE_WINDOW_HOURS;
use broom_fairy_postgres::PoolSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },

    /// A variable required by the selected options is missing
    #[error("Missing required variable {0}")]
    Missing(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Storage backend
    pub storage: StorageConfig,
    /// Booking rules and notification delivery
    pub bookings: BookingsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Where bookings are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Process-local maps; everything is lost on restart
    Memory,
    /// `PostgreSQL` through a connection pool
    Postgres(PostgresConfig),
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
}

impl PostgresConfig {
    /// Pool settings for [`broom_fairy_postgres::connect`]
    #[must_use]
    pub const fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout,
        }
    }
}

/// Booking rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingsConfig {
    /// Free-cancellation window in hours
    pub cancellation_window_hours: u32,
    /// Buffered notifications per subscriber before old ones are dropped
    pub notification_capacity: usize,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is malformed or the postgres
    /// backend is selected without `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let server = ServerConfig {
            host: vars.string("HOST", "0.0.0.0"),
            port: vars.parse("PORT", 8080)?,
            log_level: vars.string("RUST_LOG", "broom_fairy_bookings=info,tower_http=debug"),
            metrics_host: vars.string("METRICS_HOST", "0.0.0.0"),
            metrics_port: vars.parse("METRICS_PORT", 9090)?,
            shutdown_timeout: vars.parse("SHUTDOWN_TIMEOUT", 30)?,
        };

        let backend = vars.string("STORAGE_BACKEND", "memory");
        let storage = match backend.to_ascii_lowercase().as_str() {
            "memory" => StorageConfig::Memory,
            "postgres" => StorageConfig::Postgres(PostgresConfig {
                url: vars
                    .get("DATABASE_URL")
                    .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))?,
                max_connections: vars.parse("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: vars.parse("DATABASE_MIN_CONNECTIONS", 2)?,
                connect_timeout: vars.parse("DATABASE_CONNECT_TIMEOUT", 30)?,
            }),
            _ => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND".to_string(),
                    value: backend,
                    reason: "expected memory or postgres".to_string(),
                });
            },
        };

        let bookings = BookingsConfig {
            cancellation_window_hours: vars.parse("CANCELLATION_WINDOW_HOURS", DEFAULT_FREE_WINDOW_HOURS)?,
            notification_capacity: vars.parse("NOTIFICATION_CAPACITY", 256)?,
        };
        if bookings.notification_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "NOTIFICATION_CAPACITY".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            server,
            storage,
            bookings,
        })
    }

    /// Address the HTTP server binds to
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Address the Prometheus exporter binds to
    #[must_use]
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.server.metrics_host, self.server.metrics_port)
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
                value,
            }),
        }
    }
}
