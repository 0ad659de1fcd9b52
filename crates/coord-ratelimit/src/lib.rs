//! Multi-axis (concurrent / per-second / per-minute) distributed rate
//! limiting.
//!
//! All three axes are checked and updated inside one atomic script per
//! `acquire`, server-side, so the sliding window stays exact regardless of
//! clock skew between replicas — see [`limiter::RateLimiter::acquire_with_key`].

mod config;
mod error;
mod limiter;
mod scripts;

pub use config::RateLimiterConfig;
pub use error::Error;
pub use limiter::{AxisMetrics, RateLimiter, RateLimiterMetrics, Transaction};

/// Registry of cache-name to base-key, consulted by the Health Observer.
/// Share one instance across every [`RateLimiter`] in a process.
pub type RateLimiterRegistry = coord_common::Registry<String>;
