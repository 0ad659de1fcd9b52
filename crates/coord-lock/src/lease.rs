//! The held lease: manual refresh/unlock and the auto-refresh worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use coord_common::Registry;
use coord_kv::KvClient;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{config::LockConfig, engine::log_refresh_suppressed, scripts, Error};

type Result<T> = std::result::Result<T, Error>;

/// A held lock lease.
///
/// Dropping without calling [`LeaseGuard::unlock`] stops any running
/// auto-refresh worker immediately and best-effort releases the key; the
/// canonical recovery path if the holding task panics is for the
/// application to cancel the refresh context in its own cleanup handler and
/// let the lease expire at TTL, since a panic mid-drop cannot be awaited.
pub struct LeaseGuard {
    kv: KvClient,
    full_key: String,
    fencing_value: u128,
    config: LockConfig,
    registry: Registry<bool>,
    acquired: Arc<AtomicBool>,
    lease_cancel: CancellationToken,
    refresh_task: Option<JoinHandle<()>>,
}

impl LeaseGuard {
    pub(crate) fn new(
        kv: KvClient,
        full_key: String,
        fencing_value: u128,
        config: LockConfig,
        registry: Registry<bool>,
    ) -> Self {
        Self {
            kv,
            full_key,
            fencing_value,
            config,
            registry,
            acquired: Arc::new(AtomicBool::new(true)),
            lease_cancel: CancellationToken::new(),
            refresh_task: None,
        }
    }

    /// The fencing value proving this instance's ownership.
    pub fn fencing_value(&self) -> u128 {
        self.fencing_value
    }

    /// True while this lease is believed held (cleared by `unlock` or a
    /// failed refresh/unlock ownership check).
    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::Acquire)
    }

    /// Compare-and-extend the TTL. Mismatch (lost ownership) returns
    /// [`Error::NotHeld`] and marks the guard as no longer acquired.
    #[instrument(skip(self), fields(key = %self.full_key))]
    pub async fn refresh(&self) -> Result<()> {
        refresh_once(&self.kv, &self.full_key, self.fencing_value, self.config.ttl)
            .await
            .map_err(|e| {
                self.acquired.store(false, Ordering::Release);
                e
            })
    }

    /// Launch the auto-refresh worker, ticking every `refresh_interval` and
    /// calling `refresh`.
    ///
    /// In non-persistent mode the first refresh error ends the worker and
    /// is delivered on the returned channel. In persistent mode refresh
    /// errors are suppressed and retried each tick — the channel only fires
    /// when `cancel` is cancelled or `unlock`/`close` stops the lease, using
    /// an internal, detached timer for the refresh call itself so that an
    /// upstream cancellation meant only for business work never tears down
    /// the lease mid-tick.
    pub fn auto_refresh(&mut self, cancel: CancellationToken) -> oneshot::Receiver<Error> {
        let (tx, rx) = oneshot::channel();
        let kv = self.kv.clone();
        let full_key = self.full_key.clone();
        let fencing_value = self.fencing_value;
        let ttl = self.config.ttl;
        let refresh_interval = self.config.refresh_interval;
        let persistent = self.config.persistent_refresh;
        let lease_cancel = self.lease_cancel.clone();
        let acquired = Arc::clone(&self.acquired);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(refresh_interval) => {
                        match refresh_once(&kv, &full_key, fencing_value, ttl).await {
                            Ok(()) => continue,
                            Err(e) if persistent => {
                                log_refresh_suppressed(&full_key, &e);
                                continue;
                            }
                            Err(e) => {
                                acquired.store(false, Ordering::Release);
                                let _ = tx.send(e);
                                break;
                            }
                        }
                    }
                    _ = cancel.cancelled() => {
                        let _ = tx.send(Error::Cancelled { key: full_key.clone() });
                        break;
                    }
                    _ = lease_cancel.cancelled() => {
                        break;
                    }
                }
            }
        });

        self.refresh_task = Some(handle);
        rx
    }

    /// Release the lease. Consumes the guard: stops the refresh worker,
    /// de-registers from the Lock Registry, and runs the compare-and-delete
    /// script. Mismatch returns [`Error::NotHeld`] without deleting the key.
    #[instrument(skip(self), fields(key = %self.full_key))]
    pub async fn unlock(mut self) -> Result<()> {
        self.lease_cancel.cancel();
        if let Some(handle) = self.refresh_task.take() {
            handle.abort();
        }

        let released: i64 = self
            .kv
            .eval(
                scripts::RELEASE,
                &[self.full_key.clone()],
                &[self.fencing_value.to_string()],
            )
            .await
            .map_err(Error::from)?;

        if let Some(name) = &self.config.cache_name {
            self.registry.remove(name);
        }

        if released == 1 {
            self.acquired.store(false, Ordering::Release);
            debug!("lock released");
            Ok(())
        } else {
            Err(Error::NotHeld {
                key: self.full_key.clone(),
            })
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.lease_cancel.cancel();
        if let Some(handle) = self.refresh_task.take() {
            handle.abort();
        }
        if !self.acquired.load(Ordering::Acquire) {
            return;
        }

        if let Some(name) = &self.config.cache_name {
            self.registry.remove(name);
        }

        let kv = self.kv.clone();
        let full_key = self.full_key.clone();
        let fencing_value = self.fencing_value.to_string();
        tokio::spawn(async move {
            let _: std::result::Result<i64, coord_kv::Error> = kv
                .eval(scripts::RELEASE, &[full_key], &[fencing_value])
                .await;
        });
    }
}

async fn refresh_once(
    kv: &KvClient,
    full_key: &str,
    fencing_value: u128,
    ttl: std::time::Duration,
) -> Result<()> {
    let refreshed: i64 = kv
        .eval(
            scripts::REFRESH,
            &[full_key.to_string()],
            &[fencing_value.to_string(), ttl.as_millis().to_string()],
        )
        .await
        .map_err(Error::from)?;

    if refreshed == 1 {
        Ok(())
    } else {
        Err(Error::NotHeld {
            key: full_key.to_string(),
        })
    }
}
