//! Monotonic fencing-value clock.
//!
//! Lock acquisitions and rate-limiter windows both need a value that only
//! ever increases within a process. `now_ns` is the raw reading, used as
//! the score inserted into sliding-window sorted sets (`coord-ratelimit`);
//! `fencing_value` layers a per-process disambiguator on top, used as the
//! fencing token compared against by Lua release/refresh scripts
//! (`coord-lock`).

use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch.
///
/// Not guaranteed strictly increasing across calls on some platforms with
/// coarse clocks. Rate-limiter window math only needs real wall-clock
/// ordering within a key, not instance uniqueness, so the raw reading is
/// used as-is there.
pub fn now_ns() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_nanos()
}

/// A random suffix generated once per process, used to disambiguate
/// fencing values produced by two instances within the same clock tick.
fn process_suffix() -> u64 {
    static SUFFIX: OnceLock<u64> = OnceLock::new();
    *SUFFIX.get_or_init(|| uuid::Uuid::new_v4().as_u128() as u64)
}

/// A fencing token unique to this acquiring instance: `now_ns` composed
/// with a per-process random suffix in the low bits. Two replicas
/// acquiring at the same coarse-clock tick still produce distinct values,
/// and later acquisitions still compare greater than earlier ones from the
/// same process since the timestamp occupies the high bits.
pub fn fencing_value() -> u128 {
    (now_ns() << 64) | process_suffix() as u128
}
