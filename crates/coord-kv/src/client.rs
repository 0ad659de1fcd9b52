//! Typed KV client over a Redis-compatible store.

use coord_common::config::RedisConnectionConfig;
use futures::stream::{self, Stream};
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::Error;

type Result<T> = std::result::Result<T, Error>;

/// KV client configuration.
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Connection settings (host/port/password/db/pool sizing/timeouts).
    pub connection: RedisConnectionConfig,
    /// Prefix prepended to every key this client touches, e.g. `"coord"`.
    /// Rendered as `"<prefix>::<key>"`.
    pub key_prefix: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            connection: RedisConnectionConfig::default(),
            key_prefix: "coord".to_string(),
        }
    }
}

impl KvConfig {
    /// Validate host/port/db/pool sizing. Hard failures; construction must
    /// not proceed on error.
    pub fn validate(&self) -> Result<()> {
        self.connection
            .validate()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        if self.key_prefix.trim().is_empty() {
            return Err(Error::Configuration("key_prefix must not be empty".into()));
        }
        Ok(())
    }
}

/// Result of a KV client health probe.
#[derive(Debug, Clone)]
pub struct KvHealth {
    pub healthy: bool,
    pub latency: Duration,
    pub error: Option<String>,
}

/// Typed, connection-pooled client over a Redis-compatible KV store.
///
/// Shared by reference across every primitive built on top of it; its
/// lifetime must exceed every lock, limiter, subscriber, and queue worker
/// constructed from it. Cloning is cheap — it clones the underlying
/// `ConnectionManager`, which multiplexes over a single pooled connection.
#[derive(Clone)]
pub struct KvClient {
    connection: ConnectionManager,
    config: KvConfig,
}

impl KvClient {
    /// Connect and validate. Construction is a hard failure on invalid
    /// configuration or an unreachable store.
    #[instrument(skip(config))]
    pub async fn connect(config: KvConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::open(config.connection.to_url())?;
        let connection = ConnectionManager::new(client).await?;

        debug!(prefix = %config.key_prefix, "kv client connected");
        Ok(Self { connection, config })
    }

    fn conn(&self) -> ConnectionManager {
        self.connection.clone()
    }

    /// Render `"<prefix>::<key>"`.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}::{}", self.config.key_prefix, key)
    }

    /// Configured pool size. `ConnectionManager` multiplexes a single
    /// managed connection rather than exposing a real idle/total pool, so
    /// this is the configuration ceiling, not a live gauge.
    pub fn configured_pool_size(&self) -> u32 {
        self.config.connection.pool_size
    }

    /// `INFO <section>` server-info retrieval, e.g. `"memory"`.
    pub async fn server_info(&self, section: &str) -> Result<String> {
        let mut conn = self.conn();
        let info: String = redis::cmd("INFO").arg(section).query_async(&mut conn).await?;
        Ok(info)
    }

    /// `PING` the store.
    pub async fn ping(&self) -> Result<KvHealth> {
        let start = std::time::Instant::now();
        let mut conn = self.conn();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(resp) if resp == "PONG" => Ok(KvHealth {
                healthy: true,
                latency: start.elapsed(),
                error: None,
            }),
            Ok(resp) => Ok(KvHealth {
                healthy: false,
                latency: start.elapsed(),
                error: Some(format!("unexpected PING response: {resp}")),
            }),
            Err(e) => Ok(KvHealth {
                healthy: false,
                latency: start.elapsed(),
                error: Some(e.to_string()),
            }),
        }
    }

    /// Get a string. Missing key returns `Ok(None)`; transport failure
    /// returns `Err`.
    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn();
        let value: Option<String> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    /// Get bytes. Missing key returns `Ok(None)`.
    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn();
        let value: Option<Vec<u8>> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    /// Get an integer. Missing key returns `Ok(None)`.
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.conn();
        let value: Option<i64> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    /// Get a float. Missing key returns `Ok(None)`.
    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        let mut conn = self.conn();
        let value: Option<f64> = conn.get(self.full_key(key)).await?;
        Ok(value)
    }

    /// Get a boolean, stored as `"1"`/`"0"`. Missing key returns `Ok(None)`.
    pub async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let value = self.get_int(key).await?;
        Ok(value.map(|v| v != 0))
    }

    /// Get a JSON value and deserialize it into `T`. Missing key returns
    /// `Ok(None)`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = self.get_string(key).await?;
        match raw {
            Some(s) => {
                let parsed = serde_json::from_str(&s).map_err(|source| Error::Deserialization {
                    key: key.to_string(),
                    source,
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a string. `ttl = None` means no expiry.
    pub async fn set_string(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn();
        let full = self.full_key(key);
        match ttl {
            Some(ttl) if !ttl.is_zero() => {
                conn.set_ex(full, value, ttl.as_secs()).await?;
            }
            _ => {
                conn.set(full, value).await?;
            }
        }
        Ok(())
    }

    /// Set bytes. `ttl = None` means no expiry.
    pub async fn set_bytes(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn();
        let full = self.full_key(key);
        match ttl {
            Some(ttl) if !ttl.is_zero() => {
                conn.set_ex(full, value, ttl.as_secs()).await?;
            }
            _ => {
                conn.set(full, value).await?;
            }
        }
        Ok(())
    }

    /// Set an integer. `ttl = None` means no expiry.
    pub async fn set_int(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<()> {
        self.set_string(key, &value.to_string(), ttl).await
    }

    /// Set a float. `ttl = None` means no expiry.
    pub async fn set_float(&self, key: &str, value: f64, ttl: Option<Duration>) -> Result<()> {
        self.set_string(key, &value.to_string(), ttl).await
    }

    /// Set a boolean. `ttl = None` means no expiry.
    pub async fn set_bool(&self, key: &str, value: bool, ttl: Option<Duration>) -> Result<()> {
        self.set_int(key, value as i64, ttl).await
    }

    /// Serialize `value` as JSON and set it. `ttl = None` means no expiry.
    pub async fn set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let serialized =
            serde_json::to_string(value).map_err(|source| Error::Deserialization {
                key: key.to_string(),
                source,
            })?;
        self.set_string(key, &serialized, ttl).await
    }

    /// Delete a key. Returns `true` if it existed.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn();
        let deleted: u64 = conn.del(self.full_key(key)).await?;
        Ok(deleted > 0)
    }

    /// Check key existence.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn();
        let exists: bool = conn.exists(self.full_key(key)).await?;
        Ok(exists)
    }

    /// Set or refresh a key's TTL. Returns `true` on success.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn();
        let ok: bool = conn.expire(self.full_key(key), ttl.as_secs() as i64).await?;
        Ok(ok)
    }

    /// Remaining TTL, or `None` if the key has no expiry (or does not exist).
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let mut conn = self.conn();
        let ttl: i64 = conn.ttl(self.full_key(key)).await?;
        if ttl < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl as u64)))
        }
    }

    /// Lazily scan keys matching a glob `pattern` (relative to this
    /// client's prefix is NOT applied — callers pass a fully-qualified
    /// pattern, e.g. `"coord::lock::*"`). Uses `SCAN`, never `KEYS`, so it
    /// never blocks the store while iterating a large keyspace.
    pub async fn scan(&self, pattern: &str) -> Result<impl Stream<Item = Result<String>>> {
        let mut conn = self.conn();
        let iter = conn
            .scan_match::<_, String>(pattern.to_string())
            .await?;
        // `scan_match` returns a stream borrowing the connection; collecting
        // eagerly keeps the client API connection-free between calls, at
        // the cost of buffering the full result set for very large scans.
        use futures::StreamExt;
        let keys: Vec<String> = iter.collect().await;
        Ok(stream::iter(keys.into_iter().map(Ok)))
    }

    /// Evaluate a server-side script atomically, over the given keys and
    /// string arguments. The only mechanism by which lock and rate-limiter
    /// primitives enforce multi-key invariants.
    pub async fn eval<T: redis::FromRedisValue>(
        &self,
        script: &str,
        keys: &[String],
        args: &[String],
    ) -> Result<T> {
        let mut conn = self.conn();
        let mut invocation = Script::new(script).prepare_invoke();
        for key in keys {
            invocation.key(key);
        }
        for arg in args {
            invocation.arg(arg);
        }
        let result = invocation.invoke_async(&mut conn).await?;
        Ok(result)
    }

    /// Atomically increment an integer counter by `delta`.
    pub async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.conn();
        let value: i64 = conn.incr(self.full_key(key), delta).await?;
        Ok(value)
    }
}

impl std::fmt::Debug for KvClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvClient")
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}
