//! Behavioral coverage of namespaced publish/subscribe delivery against a
//! live Redis-compatible broker. Requires `REDIS_HOST`/`REDIS_PORT`
//! (defaults to `127.0.0.1:6379`) and is excluded from the default test
//! run; run explicitly with `cargo test -- --ignored` against a disposable
//! instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use coord_common::config::RedisConnectionConfig;
use coord_kv::{KvClient, KvConfig};
use coord_pubsub::{PubSubConfig, Publisher, Subscriber, SubscriberConfig, Subscription};
use tokio::sync::Notify;

fn connection() -> RedisConnectionConfig {
    RedisConnectionConfig::from_env().unwrap_or_default()
}

async fn kv_client() -> KvClient {
    let mut config = KvConfig::default();
    config.connection = connection();
    config.key_prefix = "coord-pubsub-test".to_string();
    KvClient::connect(config)
        .await
        .expect("a live Redis-compatible store is required for this test")
}

struct CountingHandler {
    count: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

#[async_trait::async_trait]
impl coord_pubsub::MessageHandler for CountingHandler {
    async fn handle(
        &self,
        _channel: String,
        _payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.count.fetch_add(1, Ordering::AcqRel);
        self.notify.notify_one();
        Ok(())
    }
}

#[tokio::test]
#[ignore]
async fn test_published_messages_reach_namespaced_subscriber() {
    let namespace = format!("coord-pubsub-test-{}", coord_common::now_ns());
    let pubsub_config = PubSubConfig::new(connection(), namespace.clone());

    let count = Arc::new(AtomicUsize::new(0));
    let notify = Arc::new(Notify::new());
    let handler = Arc::new(CountingHandler {
        count: Arc::clone(&count),
        notify: Arc::clone(&notify),
    });

    let subscriber_config =
        SubscriberConfig::new(Subscription::Channels(vec!["events".to_string()]));
    let mut subscriber = Subscriber::new(
        pubsub_config.clone(),
        subscriber_config,
        kv_client().await,
        handler,
    )
    .unwrap();
    subscriber.start();

    // Give the worker a moment to complete its initial subscribe before publishing.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let publisher = Publisher::connect(pubsub_config).await.unwrap();
    let receivers = publisher.publish("events", b"hello").await.unwrap();
    assert!(receivers >= 1, "at least the namespaced subscriber should have received the publish");

    tokio::time::timeout(Duration::from_secs(2), notify.notified())
        .await
        .expect("handler should have been invoked for the published message");
    assert_eq!(count.load(Ordering::Acquire), 1);

    subscriber.close().await;
}

#[tokio::test]
#[ignore]
async fn test_distinct_namespaces_do_not_cross_deliver() {
    let namespace_a = format!("coord-pubsub-test-a-{}", coord_common::now_ns());
    let namespace_b = format!("coord-pubsub-test-b-{}", coord_common::now_ns());

    let count = Arc::new(AtomicUsize::new(0));
    let notify = Arc::new(Notify::new());
    let handler = Arc::new(CountingHandler {
        count: Arc::clone(&count),
        notify: Arc::clone(&notify),
    });

    let subscriber_config =
        SubscriberConfig::new(Subscription::Channels(vec!["events".to_string()]));
    let mut subscriber = Subscriber::new(
        PubSubConfig::new(connection(), namespace_a),
        subscriber_config,
        kv_client().await,
        handler,
    )
    .unwrap();
    subscriber.start();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let publisher = Publisher::connect(PubSubConfig::new(connection(), namespace_b))
        .await
        .unwrap();
    publisher.publish("events", b"hello").await.unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(300), notify.notified())
        .await
        .is_err();
    assert!(timed_out, "a publish under a different namespace must not reach this subscriber");
    assert_eq!(count.load(Ordering::Acquire), 0);

    subscriber.close().await;
}
