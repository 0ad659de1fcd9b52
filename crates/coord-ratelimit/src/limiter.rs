//! The limiter: atomic acquire, release, metrics, and cleanup.

use std::future::Future;
use std::time::{Duration, Instant};

use coord_common::{now_ns, Registry};
use coord_kv::KvClient;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{config::RateLimiterConfig, scripts, Error};

type Result<T> = std::result::Result<T, Error>;

/// Token returned from a successful `acquire`; required to `release`.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: String,
    partition: Option<String>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Per-axis metrics, present only for enabled axes.
#[derive(Debug, Clone, Copy)]
pub struct AxisMetrics {
    pub count: u64,
    pub max: u64,
    pub utilization_pct: f64,
}

/// Snapshot returned by [`RateLimiter::get_metrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimiterMetrics {
    pub active: Option<AxisMetrics>,
    pub tps: Option<AxisMetrics>,
    pub tpm: Option<AxisMetrics>,
}

/// A multi-axis rate limiter bucket, optionally partitioned by a dynamic
/// key (e.g. a user id) via [`RateLimiter::acquire_with_key`].
#[derive(Clone)]
pub struct RateLimiter {
    kv: KvClient,
    config: RateLimiterConfig,
    registry: Registry<String>,
}

impl RateLimiter {
    /// Build a limiter. Registers under `config.cache_name` in `registry`
    /// if set.
    pub fn new(kv: KvClient, config: RateLimiterConfig, registry: Registry<String>) -> Result<Self> {
        config.validate()?;
        if let Some(name) = &config.cache_name {
            registry.insert(name.clone(), format!("{}::{}", config.namespace, config.base_key));
        }
        Ok(Self { kv, config, registry })
    }

    fn keys(&self, partition: Option<&str>) -> (String, String, String) {
        let base = match partition {
            Some(p) => format!("{}::{}::{}", self.config.namespace, self.config.base_key, p),
            None => format!("{}::{}", self.config.namespace, self.config.base_key),
        };
        (
            format!("{base}::active"),
            format!("{base}::tps"),
            format!("{base}::tpm"),
        )
    }

    /// Acquire against the unpartitioned bucket.
    pub async fn acquire(&self, cancel: CancellationToken) -> Result<Transaction> {
        self.acquire_with_key(None, cancel).await
    }

    /// Acquire against `partition`'s independent bucket. `release` must be
    /// called with the `Transaction` this returns, which carries the same
    /// partition.
    #[instrument(skip(self, cancel), fields(base = %self.config.base_key, partition))]
    pub async fn acquire_with_key(
        &self,
        partition: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Transaction> {
        let (active_key, tps_key, tpm_key) = self.keys(partition);
        let transaction_id = Uuid::new_v4().to_string();
        let deadline = Instant::now() + self.config.wait_timeout;

        loop {
            let now = now_ns();
            let code: i64 = self
                .kv
                .eval(
                    scripts::ACQUIRE,
                    &[active_key.clone(), tps_key.clone(), tpm_key.clone()],
                    &[
                        self.config.max_active.to_string(),
                        self.config.max_tps.to_string(),
                        self.config.max_tpm.to_string(),
                        transaction_id.clone(),
                        now.to_string(),
                        self.config.transaction_ttl.as_secs().to_string(),
                    ],
                )
                .await
                .map_err(Error::from)?;

            if code == 1 {
                debug!(transaction_id, "rate limiter acquired");
                return Ok(Transaction {
                    id: transaction_id,
                    partition: partition.map(str::to_string),
                });
            }

            let contention = Error::from_script_code(code).unwrap_or(Error::ActiveLimitReached);

            if !self.config.wait_on_limit {
                return Err(contention);
            }
            if Instant::now() >= deadline {
                return Err(Error::WaitTimeout(self.config.wait_timeout));
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.retry_delay) => {}
                _ = cancel.cancelled() => return Err(Error::Cancelled),
            }
        }
    }

    /// Release a transaction, decrementing the active counter (a no-op if
    /// the active axis is disabled). TPS/TPM sorted-set entries are never
    /// removed here — they represent start-of-transaction events.
    pub async fn release(&self, transaction: &Transaction) -> Result<()> {
        if self.config.max_active == 0 {
            return Ok(());
        }
        let (active_key, _, _) = self.keys(transaction.partition.as_deref());
        let _: i64 = self
            .kv
            .eval(scripts::RELEASE, &[active_key], &[])
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    /// Acquire, run `f`, and release on every exit path including panic.
    /// Does not suppress the original outcome: a panic inside `f` still
    /// unwinds after release runs.
    pub async fn with_transaction<F, Fut, T>(&self, cancel: CancellationToken, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.with_transaction_key(None, cancel, f).await
    }

    /// Partitioned variant of [`RateLimiter::with_transaction`].
    pub async fn with_transaction_key<F, Fut, T>(
        &self,
        partition: Option<&str>,
        cancel: CancellationToken,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let transaction = self.acquire_with_key(partition, cancel).await?;
        let result = std::panic::AssertUnwindSafe(f()).catch_unwind().await;
        self.release(&transaction).await?;
        match result {
            Ok(value) => Ok(value),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Read current counters for every enabled axis.
    pub async fn get_metrics(&self, partition: Option<&str>) -> Result<RateLimiterMetrics> {
        let (active_key, tps_key, tpm_key) = self.keys(partition);
        let now = now_ns();
        let raw: (i64, i64, i64) = self
            .kv
            .eval(
                scripts::METRICS,
                &[active_key, tps_key, tpm_key],
                &[now.to_string()],
            )
            .await
            .map_err(Error::from)?;

        let axis = |count: i64, max: u64| {
            (max > 0).then(|| AxisMetrics {
                count: count.max(0) as u64,
                max,
                utilization_pct: if max == 0 {
                    0.0
                } else {
                    (count.max(0) as f64 / max as f64) * 100.0
                },
            })
        };

        Ok(RateLimiterMetrics {
            active: axis(raw.0, self.config.max_active),
            tps: axis(raw.1, self.config.max_tps),
            tpm: axis(raw.2, self.config.max_tpm),
        })
    }

    /// Delete the three derived keys and de-register from the limiter
    /// registry.
    pub async fn cleanup(&self, partition: Option<&str>) -> Result<()> {
        let (active_key, tps_key, tpm_key) = self.keys(partition);
        // Deleted via eval, like acquire/release/metrics, so it addresses
        // exactly the keys those scripts operate on — KvClient's own
        // key-prefix accessors (`get`/`set`/`delete`) are a separate,
        // unrelated namespacing layer for plain consumers.
        let _: i64 = self
            .kv
            .eval(scripts::CLEANUP, &[active_key, tps_key, tpm_key], &[])
            .await
            .map_err(Error::from)?;
        if let Some(name) = &self.config.cache_name {
            self.registry.remove(name);
        }
        Ok(())
    }
}
