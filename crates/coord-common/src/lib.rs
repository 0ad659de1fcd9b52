//! Shared utilities for the distributed-coordination toolkit.
//!
//! This crate provides the ambient concerns every primitive crate
//! (`coord-kv`, `coord-lock`, `coord-ratelimit`, `coord-pubsub`,
//! `coord-queue`, `coord-health`) leans on:
//! - layered configuration loading
//! - structured logging setup
//! - retry/backoff helpers
//! - a process-wide registry primitive used for health aggregation
//! - the `now_ns` clock and the `fencing_value` instance-unique token
//!   built on top of it

pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod telemetry;
pub mod time;

pub use config::CoordinatorConfig;
pub use error::{Error, ErrorKind};
pub use registry::Registry;
pub use retry::{retry_with_backoff, RetryConfig};
pub use telemetry::init_tracing;
pub use time::{fencing_value, now_ns};
