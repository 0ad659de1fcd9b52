//! Configuration management shared across the coordination toolkit.
//!
//! Mirrors the layered file + environment loading the wider platform uses,
//! but scoped to the handful of settings every primitive needs: how to
//! reach the KV store, and how to log. Primitive-specific settings (lock
//! TTLs, rate-limiter axes, subscriber pool sizes, queue batch sizes) live
//! in their owning crates and are not duplicated here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Error;

/// Connection settings for the Redis-compatible KV store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConnectionConfig {
    /// Hostname or IP of the KV store.
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional password (`AUTH`).
    #[serde(default)]
    pub password: Option<String>,
    /// Logical database index.
    #[serde(default)]
    pub db: u8,
    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Connection establishment timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// Per-command timeout.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: Duration,
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: None,
            db: 0,
            pool_size: default_pool_size(),
            connect_timeout: default_connect_timeout(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl RedisConnectionConfig {
    /// Load from `REDIS_HOST`/`REDIS_PORT`/`REDIS_PASSWORD`/`REDIS_DB` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("REDIS_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("REDIS_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::Configuration(format!("invalid REDIS_PORT: {port}")))?;
        }
        config.password = std::env::var("REDIS_PASSWORD").ok();
        if let Ok(db) = std::env::var("REDIS_DB") {
            config.db = db
                .parse()
                .map_err(|_| Error::Configuration(format!("invalid REDIS_DB: {db}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration, rejecting values that can never yield a
    /// working connection. Hard failure: construction must not proceed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::Configuration("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Error::Configuration("port must be in 1..=65535".into()));
        }
        if self.db > 15 {
            return Err(Error::Configuration("db must be in 0..=15".into()));
        }
        if self.pool_size == 0 {
            return Err(Error::Configuration("pool_size must be positive".into()));
        }
        Ok(())
    }

    /// Render as a `redis://` connection URL.
    pub fn to_url(&self) -> String {
        let auth = self
            .password
            .as_ref()
            .map(|p| format!(":{p}@"))
            .unwrap_or_default();
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.db)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Logging configuration shared by every binary embedding the toolkit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Emit JSON-formatted logs instead of human-readable ones.
    #[serde(default)]
    pub json_logging: bool,
    /// Log level filter (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logging: false,
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Aggregate configuration for an application embedding the full toolkit.
///
/// Individual primitives (locks, limiters, subscriptions, queue workers)
/// still take their own options records; this type exists for
/// applications that want one `config::Config` source layered from a file
/// and the environment, the way the wider platform's `AppConfig` does.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoordinatorConfig {
    pub redis: RedisConnectionConfig,
    pub telemetry: TelemetryConfig,
    /// Key/channel namespace prefix shared by all primitives.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    "coord".to_string()
}

impl CoordinatorConfig {
    /// Load from an optional config file layered under environment
    /// variables prefixed `COORD_` (e.g. `COORD_REDIS_HOST`).
    pub fn load(config_path: Option<&str>) -> Result<Self, Error> {
        let mut builder = config::Config::builder()
            .set_default("namespace", default_namespace())
            .map_err(|e| Error::Configuration(e.to_string()))?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("COORD")
                .separator("_")
                .try_parsing(true),
        );

        let raw = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let parsed: Self = raw
            .try_deserialize()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        parsed.redis.validate()?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_redis_config() {
        let config = RedisConnectionConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let config = RedisConnectionConfig {
            host: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_db_out_of_range() {
        let config = RedisConnectionConfig {
            db: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pool_size() {
        let config = RedisConnectionConfig {
            pool_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_url_without_password() {
        let config = RedisConnectionConfig::default();
        assert_eq!(config.to_url(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn test_to_url_with_password() {
        let config = RedisConnectionConfig {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.to_url(), "redis://:secret@127.0.0.1:6379/0");
    }
}
