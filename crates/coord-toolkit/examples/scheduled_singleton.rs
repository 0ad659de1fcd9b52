//! Exactly-one-active cron scheduler across N replicas.
//!
//! 1. Block until a scheduled-task lock is acquired (infinite retry).
//! 2. Launch `auto_refresh` bound to the application's root cancellation.
//! 3. Run a cron-like tick loop; each fired job wraps its body in a
//!    single-attempt lock keyed by job name (per-job dedupe, in case two
//!    replicas somehow both believe they hold the scheduler lease during a
//!    handover).
//! 4. Monitor the refresh-error channel; any terminal signal stops the
//!    loop, releases the scheduler lease, and exits.
//!
//! This mirrors the platform's own split between a worker that executes
//! jobs and a scheduler that decides when to fire them, with the scheduler
//! lease itself now distributed rather than assumed single-process.

use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use coord_toolkit::kv::{KvClient, KvConfig};
use coord_toolkit::lock::{Lock, LockConfig, LockRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A cron-like schedule expression, minute-granularity.
#[derive(Debug, Clone, Copy)]
struct Schedule {
    minute: Option<u32>,
    hour: Option<u32>,
}

impl Schedule {
    fn hourly(minute: u32) -> Self {
        Self {
            minute: Some(minute),
            hour: None,
        }
    }

    fn matches(&self, time: &DateTime<Utc>) -> bool {
        if let Some(minute) = self.minute {
            if time.minute() != minute {
                return false;
            }
        }
        if let Some(hour) = self.hour {
            if time.hour() != hour {
                return false;
            }
        }
        true
    }
}

struct ScheduledJob {
    name: &'static str,
    schedule: Schedule,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coord_toolkit::common::telemetry::init_tracing(false, "info")?;

    let kv = KvClient::connect(KvConfig::default()).await?;
    let scheduler_lock_registry = LockRegistry::new();
    let job_lock_registry = LockRegistry::new();

    let scheduler_lock = Lock::new(
        kv.clone(),
        "cron-scheduler",
        LockConfig::scheduled_task(
            "scheduler",
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
        .with_cache_name("cron-scheduler"),
        scheduler_lock_registry,
    )?;

    let root_cancel = CancellationToken::new();

    info!("waiting to acquire scheduler singleton lease");
    let mut guard = scheduler_lock.lock(root_cancel.clone()).await?;
    info!(fencing_value = %guard.fencing_value(), "acquired scheduler lease");

    let mut refresh_errors = guard.auto_refresh(root_cancel.clone());

    let jobs = vec![
        ScheduledJob {
            name: "cleanup-expired-leases",
            schedule: Schedule::hourly(0),
        },
        ScheduledJob {
            name: "publish-metrics-snapshot",
            schedule: Schedule::hourly(30),
        },
    ];

    let mut tick = tokio::time::interval(Duration::from_secs(10));
    let mut last_check = Utc::now();

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = Utc::now();
                for job in &jobs {
                    if job.schedule.matches(&now) && !job.schedule.matches(&last_check) {
                        run_job_with_dedupe(&kv, job_lock_registry.clone(), job.name).await;
                    }
                }
                last_check = now;
            }
            result = &mut refresh_errors => {
                match result {
                    Ok(err) => error!(error = %err, "scheduler lease refresh failed terminally"),
                    Err(_) => warn!("refresh-error channel closed"),
                }
                break;
            }
        }
    }

    root_cancel.cancel();
    guard.unlock().await?;
    info!("scheduler lease released, exiting");
    Ok(())
}

async fn run_job_with_dedupe(kv: &KvClient, job_locks: LockRegistry, job_name: &'static str) {
    let dedupe = match Lock::new(
        kv.clone(),
        job_name,
        LockConfig::single_attempt(format!("cron-job::{job_name}"), Duration::from_secs(60)),
        job_locks,
    ) {
        Ok(lock) => lock,
        Err(e) => {
            error!(job = job_name, error = %e, "failed to construct job dedupe lock");
            return;
        }
    };

    let guard = match dedupe.lock(CancellationToken::new()).await {
        Ok(guard) => guard,
        Err(e) => {
            warn!(job = job_name, error = %e, "skipping job, dedupe lock not acquired");
            return;
        }
    };

    info!(job = job_name, "running scheduled job");
    // ... job body goes here ...

    if let Err(e) = guard.unlock().await {
        warn!(job = job_name, error = %e, "job dedupe lock release failed");
    }
}
