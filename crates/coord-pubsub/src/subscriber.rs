//! Resilient multi-worker subscriber.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use coord_kv::KvClient;
use futures::StreamExt;
use redis::Client;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::{PubSubConfig, Subscription, SubscriberConfig},
    Error,
};

/// Application-supplied message handler. Errors are logged and counted,
/// never propagated — a misbehaving handler must not tear down the
/// subscription.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(
        &self,
        channel: String,
        payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(String, Vec<u8>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>>
        + Send,
{
    async fn handle(
        &self,
        channel: String,
        payload: Vec<u8>,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (self)(channel, payload).await
    }
}

/// A pool of workers subscribed to the same channels/patterns, each
/// independently reconnecting on stream closure.
pub struct Subscriber {
    client: Client,
    kv: KvClient,
    namespace: String,
    config: SubscriberConfig,
    handler: Arc<dyn MessageHandler>,
    running: Arc<AtomicBool>,
    reconnect_attempts: Arc<AtomicU32>,
    handler_errors: Arc<AtomicU64>,
    stop: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl Subscriber {
    /// Build a subscriber. Does not connect until [`Subscriber::start`].
    pub fn new(
        pubsub_config: PubSubConfig,
        config: SubscriberConfig,
        kv: KvClient,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self, Error> {
        pubsub_config.validate()?;
        config.validate()?;
        let client = Client::open(pubsub_config.connection.to_url())?;
        Ok(Self {
            client,
            kv,
            namespace: pubsub_config.channel_namespace,
            config,
            handler,
            running: Arc::new(AtomicBool::new(false)),
            reconnect_attempts: Arc::new(AtomicU32::new(0)),
            handler_errors: Arc::new(AtomicU64::new(0)),
            stop: CancellationToken::new(),
            workers: Vec::new(),
        })
    }

    fn full_targets(&self) -> Subscription {
        match &self.config.subscription {
            Subscription::Channels(c) => {
                Subscription::Channels(c.iter().map(|c| format!("{}::{}", self.namespace, c)).collect())
            }
            Subscription::Patterns(p) => {
                Subscription::Patterns(p.iter().map(|p| format!("{}::{}", self.namespace, p)).collect())
            }
        }
    }

    /// Spawn `pool_size` worker tasks, each looping receive-then-reconnect.
    pub fn start(&mut self) {
        self.running.store(true, Ordering::Release);
        let targets = self.full_targets();

        for worker_id in 0..self.config.pool_size {
            let client = self.client.clone();
            let handler = Arc::clone(&self.handler);
            let running = Arc::clone(&self.running);
            let reconnect_attempts = Arc::clone(&self.reconnect_attempts);
            let handler_errors = Arc::clone(&self.handler_errors);
            let stop = self.stop.clone();
            let reconnect_delay = self.config.reconnect_delay;
            let max_reconnect_attempts = self.config.max_reconnect_attempts;
            let targets = targets.clone_inner();

            let handle = tokio::spawn(async move {
                worker_loop(
                    worker_id,
                    client,
                    targets,
                    handler,
                    running,
                    reconnect_attempts,
                    handler_errors,
                    stop,
                    reconnect_delay,
                    max_reconnect_attempts,
                )
                .await;
            });
            self.workers.push(handle);
        }
    }

    /// Cancel the internal context. Idempotent.
    pub fn stop(&self) {
        self.stop.cancel();
        self.running.store(false, Ordering::Release);
    }

    /// `stop` then yield briefly so workers can exit. Idempotent.
    pub async fn close(&mut self) {
        self.stop();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        for handle in self.workers.drain(..) {
            handle.abort();
        }
    }

    /// `UP` iff running and the shared KV client's ping succeeds.
    pub async fn health_check(&self) -> bool {
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        matches!(self.kv.ping().await, Ok(h) if h.healthy)
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::Acquire)
    }

    /// Total handler errors observed. Counted for observability; never
    /// propagated — a misbehaving handler must not tear down the
    /// subscription.
    pub fn handler_error_count(&self) -> u64 {
        self.handler_errors.load(Ordering::Acquire)
    }
}

impl Subscription {
    fn clone_inner(&self) -> Self {
        self.clone()
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    client: Client,
    targets: Subscription,
    handler: Arc<dyn MessageHandler>,
    running: Arc<AtomicBool>,
    reconnect_attempts: Arc<AtomicU32>,
    handler_errors: Arc<AtomicU64>,
    stop: CancellationToken,
    reconnect_delay: std::time::Duration,
    max_reconnect_attempts: u32,
) {
    loop {
        if stop.is_cancelled() {
            return;
        }

        match run_until_disconnect(
            worker_id,
            &client,
            &targets,
            &handler,
            &stop,
            &reconnect_attempts,
            &handler_errors,
        )
        .await
        {
            Ok(true) => {
                // stop was requested during a clean subscribe/receive cycle.
                return;
            }
            Ok(false) => {
                warn!(worker_id, "pub/sub stream closed, reconnecting");
            }
            Err(e) => {
                warn!(worker_id, error = %e, "pub/sub subscribe failed, reconnecting");
            }
        }

        let attempt = reconnect_attempts.fetch_add(1, Ordering::AcqRel) + 1;
        if attempt >= max_reconnect_attempts {
            error!(worker_id, attempt, "subscriber exhausted reconnect attempts");
            running.store(false, Ordering::Release);
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = stop.cancelled() => return,
        }
    }
}

/// Returns `Ok(true)` if `stop` ended the cycle cleanly, `Ok(false)` if the
/// broker closed the stream out from under us (caller should reconnect).
async fn run_until_disconnect(
    worker_id: usize,
    client: &Client,
    targets: &Subscription,
    handler: &Arc<dyn MessageHandler>,
    stop: &CancellationToken,
    reconnect_attempts: &Arc<AtomicU32>,
    handler_errors: &Arc<AtomicU64>,
) -> Result<bool, Error> {
    let mut pubsub = client.get_async_pubsub().await?;
    match targets {
        Subscription::Channels(channels) => {
            for channel in channels {
                pubsub.subscribe(channel).await?;
            }
        }
        Subscription::Patterns(patterns) => {
            for pattern in patterns {
                pubsub.psubscribe(pattern).await?;
            }
        }
    }

    reconnect_attempts.store(0, Ordering::Release);
    info!(worker_id, "pub/sub worker (re)subscribed");
    let mut stream = pubsub.on_message();

    loop {
        tokio::select! {
            message = stream.next() => {
                match message {
                    Some(message) => {
                        let channel = message.get_channel_name().to_string();
                        let payload: Vec<u8> = message.get_payload().unwrap_or_default();
                        let handler = Arc::clone(handler);
                        let handler_errors = Arc::clone(handler_errors);
                        // Best-effort concurrency: one outstanding task per
                        // message, handler errors counted but never torn
                        // down the subscription.
                        tokio::spawn(async move {
                            if let Err(e) = handler.handle(channel.clone(), payload).await {
                                handler_errors.fetch_add(1, Ordering::AcqRel);
                                warn!(channel, error = %e, "pub/sub handler error");
                            }
                        });
                    }
                    None => return Ok(false),
                }
            }
            _ = stop.cancelled() => {
                debug!(worker_id, "pub/sub worker stopping");
                return Ok(true);
            }
        }
    }
}
