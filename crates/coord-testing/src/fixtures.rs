//! Fixture builders for the toolkit's config types, using randomized but
//! realistic field values so tests don't collide on shared names when run
//! concurrently against a shared Redis instance.

use coord_lock::LockConfig;
use coord_ratelimit::RateLimiterConfig;
use fake::{faker::lorem::en::Word, Fake};
use std::time::Duration;

/// A `LockConfig` with a unique namespace, suitable for a single-attempt
/// acquisition test.
pub fn test_lock_config() -> LockConfig {
    let namespace: String = format!("test-lock-{}", Word().fake::<String>());
    LockConfig::single_attempt(namespace, Duration::from_secs(5))
}

/// A `LockConfig` configured for persistent, auto-refreshing acquisition.
pub fn test_persistent_lock_config() -> LockConfig {
    let namespace: String = format!("test-lock-{}", Word().fake::<String>());
    LockConfig::persistent(namespace, Duration::from_secs(2), Duration::from_millis(500))
}

/// A `RateLimiterConfig` with a unique namespace/base key and all three axes
/// enabled at small limits, suitable for exercising contention in tests.
pub fn test_rate_limiter_config() -> RateLimiterConfig {
    let namespace: String = format!("test-rl-{}", Word().fake::<String>());
    let base_key: String = Word().fake();
    RateLimiterConfig::new(namespace, base_key)
        .with_max_active(2)
        .with_max_tps(5)
        .with_max_tpm(50)
        .with_transaction_ttl(Duration::from_secs(10))
}
