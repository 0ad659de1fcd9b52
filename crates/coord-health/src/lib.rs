//! Composite liveness reporting over the KV, lock, rate-limiter and queue
//! primitives sharing one [`coord_kv::KvClient`].

mod observer;
mod record;

pub use observer::HealthObserver;
pub use record::{HealthRecord, HealthStatus};
