//! Composes KV, lock, rate-limiter and queue-worker liveness into one
//! [`HealthRecord`].

use std::collections::HashMap;
use std::time::Duration;

use coord_kv::KvClient;
use coord_lock::LockRegistry;
use coord_queue::WorkerRegistry;
use coord_ratelimit::RateLimiterRegistry;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::record::{HealthRecord, HealthStatus};

const SENTINEL_KEY: &str = "health::sentinel";
const SENTINEL_VALUE: &str = "ok";

/// Aggregates liveness across every primitive built on one [`KvClient`].
///
/// Registries are shared by reference with the primitives that populate
/// them — a [`coord_lock::Lock`], [`coord_ratelimit::RateLimiter`], or
/// [`coord_queue::QueueConsumer`] constructed with the same registry
/// instance becomes visible here automatically.
#[derive(Clone)]
pub struct HealthObserver {
    kv: KvClient,
    locks: LockRegistry,
    limiters: RateLimiterRegistry,
    workers: WorkerRegistry,
}

impl HealthObserver {
    pub fn new(
        kv: KvClient,
        locks: LockRegistry,
        limiters: RateLimiterRegistry,
        workers: WorkerRegistry,
    ) -> Self {
        Self {
            kv,
            locks,
            limiters,
            workers,
        }
    }

    /// Run one health probe cycle.
    pub async fn check(&self) -> HealthRecord {
        let mut details = HashMap::new();

        let ping = self.kv.ping().await;
        let kv_ping_ok = matches!(&ping, Ok(h) if h.healthy);
        details.insert(
            "kv_ping_latency_ms".to_string(),
            ping.as_ref()
                .map(|h| h.latency.as_millis().to_string())
                .unwrap_or_else(|_| "unavailable".to_string()),
        );

        let sentinel_ok = self.sentinel_round_trip().await;
        details.insert("kv_sentinel_round_trip".to_string(), sentinel_ok.to_string());

        details.insert(
            "kv_configured_pool_size".to_string(),
            self.kv.configured_pool_size().to_string(),
        );

        if let Ok(info) = self.kv.server_info("memory").await {
            if let Some(used) = parse_info_field(&info, "used_memory_human") {
                details.insert("kv_used_memory".to_string(), used);
            }
        }

        let lock_status: HashMap<String, bool> = self
            .locks
            .snapshot()
            .into_iter()
            .collect();

        for (name, base_key) in self.limiters.snapshot() {
            details.insert(format!("rate_limiter::{name}"), base_key);
        }

        let worker_statuses = self.workers.snapshot();
        for (name, up) in &worker_statuses {
            details.insert(format!("queue_worker::{name}"), up.to_string());
        }

        let has_dependents =
            !lock_status.is_empty() || !self.limiters.is_empty() || !worker_statuses.is_empty();
        let all_workers_up = worker_statuses.iter().all(|(_, up)| *up);
        let kv_up = kv_ping_ok && sentinel_ok;

        let status = if !kv_up {
            HealthStatus::Down
        } else if !has_dependents {
            HealthStatus::Unknown
        } else if all_workers_up {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        HealthRecord {
            status,
            details,
            lock_status: if lock_status.is_empty() {
                None
            } else {
                Some(lock_status)
            },
        }
    }

    async fn sentinel_round_trip(&self) -> bool {
        let write = self.kv.set_string(SENTINEL_KEY, SENTINEL_VALUE, Some(Duration::from_secs(30))).await;
        if write.is_err() {
            return false;
        }
        let read = self.kv.get_string(SENTINEL_KEY).await;
        let read_ok = matches!(read, Ok(Some(v)) if v == SENTINEL_VALUE);
        let _ = self.kv.delete(SENTINEL_KEY).await;
        read_ok
    }

    /// Run `check` on a ticker until `cancel` fires, sending each record on
    /// the returned channel.
    pub fn spawn_periodic(
        &self,
        interval: Duration,
        cancel: CancellationToken,
    ) -> mpsc::Receiver<HealthRecord> {
        let (tx, rx) = mpsc::channel(8);
        let observer = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let record = observer.check().await;
                        debug!(status = %record.status, "periodic health check");
                        if tx.send(record).await.is_err() {
                            return;
                        }
                    }
                    _ = cancel.cancelled() => return,
                }
            }
        });

        rx
    }
}

fn parse_info_field(info: &str, field: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix(&format!("{field}:")))
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_field() {
        let info = "# Memory\r\nused_memory:123456\r\nused_memory_human:120.56K\r\n";
        assert_eq!(
            parse_info_field(info, "used_memory_human"),
            Some("120.56K".to_string())
        );
    }

    #[test]
    fn test_parse_info_field_missing() {
        let info = "# Memory\r\nused_memory:123456\r\n";
        assert_eq!(parse_info_field(info, "used_memory_human"), None);
    }
}
