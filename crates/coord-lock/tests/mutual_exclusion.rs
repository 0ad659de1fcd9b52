//! Behavioral coverage of the lock engine's core invariants against a live
//! Redis-compatible store. Requires `REDIS_HOST`/`REDIS_PORT` (defaults to
//! `127.0.0.1:6379`) and is excluded from the default test run since the
//! sandboxed unit suite has no store to reach; run explicitly with
//! `cargo test -- --ignored` against a disposable instance.

use std::time::Duration;

use coord_common::Registry;
use coord_kv::{KvClient, KvConfig};
use coord_lock::{Lock, LockConfig};
use tokio_util::sync::CancellationToken;

async fn connect() -> KvClient {
    let mut config = KvConfig::default();
    config.connection = coord_common::config::RedisConnectionConfig::from_env()
        .unwrap_or_default();
    config.key_prefix = "coord-lock-test".to_string();
    KvClient::connect(config)
        .await
        .expect("a live Redis-compatible store is required for this test")
}

fn unique_namespace(tag: &str) -> String {
    format!("coord-lock-test::{tag}::{}", coord_common::now_ns())
}

#[tokio::test]
#[ignore]
async fn test_mutual_exclusion_among_concurrent_acquirers() {
    let kv = connect().await;
    let namespace = unique_namespace("mutex");
    let registry: Registry<bool> = Registry::new();

    let mut successes = 0usize;
    let mut guards = Vec::new();
    for _ in 0..5 {
        let config = LockConfig::single_attempt(namespace.clone(), Duration::from_secs(5));
        let lock = Lock::new(kv.clone(), "resource", config, registry.clone()).unwrap();
        match lock.lock(CancellationToken::new()).await {
            Ok(guard) => {
                successes += 1;
                guards.push(guard);
            }
            Err(coord_lock::Error::NotAcquired { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1, "exactly one of five single-attempt acquirers should win");

    for guard in guards {
        guard.unlock().await.unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_expired_lease_is_reacquirable_and_original_unlock_fails() {
    let kv = connect().await;
    let namespace = unique_namespace("expiry");
    let registry: Registry<bool> = Registry::new();

    let config_a = LockConfig::single_attempt(namespace.clone(), Duration::from_millis(300));
    let lock_a = Lock::new(kv.clone(), "resource", config_a, registry.clone()).unwrap();
    let guard_a = lock_a.lock(CancellationToken::new()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let config_b = LockConfig::single_attempt(namespace.clone(), Duration::from_secs(5));
    let lock_b = Lock::new(kv.clone(), "resource", config_b, registry.clone()).unwrap();
    let guard_b = lock_b
        .lock(CancellationToken::new())
        .await
        .expect("lock should be reacquirable once the original lease expired");

    let release = guard_a.unlock().await;
    assert!(
        matches!(release, Err(coord_lock::Error::NotHeld { .. })),
        "stale holder's unlock must fail with the ownership error and not delete the new holder's key"
    );

    guard_b.unlock().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_retry_lock_exhausts_budget_with_expected_attempt_count() {
    let kv = connect().await;
    let namespace = unique_namespace("retry");
    let registry: Registry<bool> = Registry::new();

    let holder_config = LockConfig::single_attempt(namespace.clone(), Duration::from_secs(5));
    let holder = Lock::new(kv.clone(), "resource", holder_config, registry.clone()).unwrap();
    let _held = holder.lock(CancellationToken::new()).await.unwrap();

    let contender_config = LockConfig::retry(
        namespace.clone(),
        Duration::from_secs(5),
        2,
        Duration::from_millis(20),
    );
    let contender = Lock::new(kv.clone(), "resource", contender_config, registry.clone()).unwrap();

    match contender.lock(CancellationToken::new()).await {
        Err(coord_lock::Error::NotAcquired { attempts, .. }) => {
            assert_eq!(attempts, 3, "max_retries=2 should total 3 attempts (first + 2 retries)");
        }
        other => panic!("expected NotAcquired, got {other:?}"),
    }
}

#[tokio::test]
#[ignore]
async fn test_cancellation_aborts_retry_loop_promptly() {
    let kv = connect().await;
    let namespace = unique_namespace("cancel");
    let registry: Registry<bool> = Registry::new();

    let holder_config = LockConfig::single_attempt(namespace.clone(), Duration::from_secs(5));
    let holder = Lock::new(kv.clone(), "resource", holder_config, registry.clone()).unwrap();
    let _held = holder.lock(CancellationToken::new()).await.unwrap();

    let contender_config = LockConfig::retry(
        namespace.clone(),
        Duration::from_secs(5),
        1000,
        Duration::from_secs(1),
    );
    let contender = Lock::new(kv.clone(), "resource", contender_config, registry.clone()).unwrap();

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel_clone.cancel();
    });

    let started = std::time::Instant::now();
    let result = contender.lock(cancel).await;
    assert!(started.elapsed() < Duration::from_secs(1), "cancellation should abort well inside the 1s retry_delay");
    assert!(matches!(result, Err(coord_lock::Error::Cancelled { .. })));
}

#[tokio::test]
#[ignore]
async fn test_persistent_auto_refresh_keeps_lease_alive_past_original_ttl() {
    let kv = connect().await;
    let namespace = unique_namespace("refresh");
    let registry: Registry<bool> = Registry::new();

    let config = LockConfig::persistent(
        namespace.clone(),
        Duration::from_millis(300),
        Duration::from_millis(100),
    );
    let lock = Lock::new(kv.clone(), "resource", config, registry.clone()).unwrap();
    let mut guard = lock.lock(CancellationToken::new()).await.unwrap();
    let _error_rx = guard.auto_refresh(CancellationToken::new());

    tokio::time::sleep(Duration::from_millis(800)).await;

    let contender_config = LockConfig::single_attempt(namespace.clone(), Duration::from_secs(5));
    let contender = Lock::new(kv.clone(), "resource", contender_config, registry.clone()).unwrap();
    let contend_result = contender.lock(CancellationToken::new()).await;
    assert!(
        matches!(contend_result, Err(coord_lock::Error::NotAcquired { .. })),
        "auto-refresh should have kept the lease alive well past the original 300ms ttl"
    );

    guard.unlock().await.unwrap();
}
