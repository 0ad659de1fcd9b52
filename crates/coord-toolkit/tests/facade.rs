//! Smoke tests that the facade re-exports line up with each primitive
//! crate's public surface.

use coord_toolkit::kv::KvConfig;
use coord_toolkit::lock::LockConfig;
use coord_toolkit::pubsub::SubscriberConfig;
use coord_toolkit::queue::QueueConfig;
use coord_toolkit::ratelimit::RateLimiterConfig;
use std::time::Duration;

#[test]
fn test_kv_config_reachable_through_facade() {
    let config = KvConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_lock_config_reachable_through_facade() {
    let config = LockConfig::single_attempt("ns", Duration::from_secs(5));
    assert!(config.validate().is_ok());
}

#[test]
fn test_rate_limiter_config_reachable_through_facade() {
    let config = RateLimiterConfig::new("ns", "api").with_max_tpm(10);
    assert!(config.validate().is_ok());
}

#[test]
fn test_queue_config_reachable_through_facade() {
    let config = QueueConfig::new("https://sqs.us-east-1.amazonaws.com/000000000000/jobs");
    assert!(config.validate().is_ok());
}

#[test]
fn test_subscriber_config_rejects_empty_subscription() {
    use coord_toolkit::pubsub::Subscription;
    let config = SubscriberConfig::new(Subscription::Channels(vec![]));
    assert!(config.validate().is_err());
}
