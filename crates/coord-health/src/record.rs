//! The composite health record.

use std::collections::HashMap;

/// Aggregate health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every probed subsystem is healthy.
    Up,
    /// At least one probed subsystem failed.
    Down,
    /// No primitives are registered to probe against; distinct from `Down`
    /// because there is nothing to have failed.
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Up => "UP",
            HealthStatus::Down => "DOWN",
            HealthStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Composite health snapshot produced by [`crate::HealthObserver::check`].
#[derive(Debug, Clone)]
pub struct HealthRecord {
    pub status: HealthStatus,
    /// Free-form probe details: ping latency, server-info excerpts,
    /// configured pool size, per-worker and per-limiter summaries.
    pub details: HashMap<String, String>,
    /// Acquired/not-acquired per registered lock `cache_name`. `None` if no
    /// locks are registered.
    pub lock_status: Option<HashMap<String, bool>>,
}
