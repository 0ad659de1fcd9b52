//! The lock engine: acquire algorithm and registry wiring.

use coord_common::{fencing_value, Registry};
use coord_kv::KvClient;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{config::LockConfig, lease::LeaseGuard, scripts, Error};

type Result<T> = std::result::Result<T, Error>;

/// Builds and acquires leases for a single lock key.
///
/// Cheap to construct per key; the expensive shared state (connection pool,
/// registry) lives in the `KvClient` and `Registry` it borrows.
#[derive(Clone)]
pub struct Lock {
    kv: KvClient,
    config: LockConfig,
    registry: Registry<bool>,
    full_key: String,
}

impl Lock {
    /// Build a lock bound to `key` under `config.namespace`, registering
    /// acquired state under `registry`.
    pub fn new(kv: KvClient, key: impl AsRef<str>, config: LockConfig, registry: Registry<bool>) -> Result<Self> {
        config.validate()?;
        let full_key = format!("{}::{}", config.namespace, key.as_ref());
        Ok(Self {
            kv,
            config,
            registry,
            full_key,
        })
    }

    /// The fully-qualified key this engine acquires leases for.
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    /// Attempt to acquire the lease.
    ///
    /// Total attempts made is `max_retries + 1` when `infinite_retry` is
    /// false — one initial attempt plus `max_retries` retries; this engine
    /// does not perform the source's extra attempt after the retry budget
    /// is exhausted. Cancelling `cancel` aborts immediately.
    #[instrument(skip(self, cancel), fields(key = %self.full_key))]
    pub async fn lock(&self, cancel: CancellationToken) -> Result<LeaseGuard> {
        let fencing_value = fencing_value();
        let fencing_arg = fencing_value.to_string();
        let ttl_ms = self.config.ttl.as_millis() as u64;

        let mut attempts: u32 = 0;
        loop {
            let acquired: i64 = self
                .kv
                .eval(
                    scripts::ACQUIRE,
                    &[self.full_key.clone()],
                    &[fencing_arg.clone(), ttl_ms.to_string()],
                )
                .await
                .map_err(Error::from)?;

            if acquired == 1 {
                break;
            }

            attempts += 1;
            if !self.config.infinite_retry && attempts > self.config.max_retries {
                return Err(Error::NotAcquired {
                    key: self.full_key.clone(),
                    attempts,
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.retry_delay) => {}
                _ = cancel.cancelled() => {
                    return Err(Error::Cancelled { key: self.full_key.clone() });
                }
            }
        }

        if let Some(name) = &self.config.cache_name {
            self.registry.insert(name.clone(), true);
        }
        debug!(fencing_value, attempts, "lock acquired");

        Ok(LeaseGuard::new(
            self.kv.clone(),
            self.full_key.clone(),
            fencing_value,
            self.config.clone(),
            self.registry.clone(),
        ))
    }

    /// Current acquired status for every registered cache name, as
    /// consumed by the Health Observer.
    pub fn status(registry: &Registry<bool>) -> Vec<(String, bool)> {
        registry.snapshot()
    }
}

pub(crate) fn log_refresh_suppressed(key: &str, error: &Error) {
    warn!(key, error = %error, "persistent lock refresh failed; suppressed and will retry");
}
