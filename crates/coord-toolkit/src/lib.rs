//! # Coordination Toolkit
//!
//! A set of distributed-coordination primitives built on a shared Redis-
//! compatible KV store and an SQS-compatible queue:
//!
//! - **KV Client** ([`kv`]): typed get/set/delete/scan/eval over a pooled
//!   connection.
//! - **Health Observer** ([`health`]): aggregates KV, lock, rate-limiter and
//!   queue-worker liveness into one composite record.
//! - **Lock Engine** ([`lock`]): single-attempt, retry, persistent and
//!   scheduled-task leases with optional auto-refresh.
//! - **Rate Limiter** ([`ratelimit`]): atomic concurrent/per-second/per-minute
//!   acquisition over sliding windows.
//! - **Pub/Sub Fabric** ([`pubsub`]): a reconnecting subscriber pool and a
//!   lightweight publisher.
//! - **Queue Worker** ([`queue`]): a long-poll receive pool and pooled
//!   sender over an SQS-compatible transport.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use coord_toolkit::kv::{KvClient, KvConfig};
//! use coord_toolkit::lock::{Lock, LockConfig, LockRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let kv = KvClient::connect(KvConfig::default()).await?;
//! let registry = LockRegistry::new();
//! let lock = Lock::new(
//!     kv,
//!     "report-export",
//!     LockConfig::single_attempt("jobs", std::time::Duration::from_secs(30)),
//!     registry,
//! )?;
//!
//! let guard = lock.lock(CancellationToken::new()).await?;
//! // ... critical section ...
//! guard.unlock().await?;
//! # Ok(())
//! # }
//! ```
//!
//! See `examples/scheduled_singleton.rs` for the canonical composition of a
//! persistent cron-singleton lock with a per-job dedupe lock.

pub mod health {
    pub use coord_health::*;
}

pub mod kv {
    pub use coord_kv::*;
}

pub mod lock {
    pub use coord_lock::*;
}

pub mod pubsub {
    pub use coord_pubsub::*;
}

pub mod queue {
    pub use coord_queue::*;
}

pub mod ratelimit {
    pub use coord_ratelimit::*;
}

pub use coord_common as common;
