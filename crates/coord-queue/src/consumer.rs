//! Long-poll receive pool and handler dispatch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use coord_common::Registry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{config::QueueConfig, Error};

/// Application-supplied message handler. An `Err` means the message is not
/// deleted and becomes visible again when its visibility timeout expires;
/// this is the queue's own concern, not this crate's.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(
        &self,
        body: String,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>>
        + Send,
{
    async fn handle(
        &self,
        body: String,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (self)(body).await
    }
}

/// A pool of long-poll receive loops dispatching to a shared handler.
///
/// At-least-once: a delete is issued only after the handler returns
/// success, so a crash between handling and deleting redelivers the
/// message. Handlers must be idempotent.
pub struct QueueConsumer {
    client: Client,
    config: QueueConfig,
    handler: Arc<dyn MessageHandler>,
    registry: Registry<bool>,
    running: Arc<AtomicBool>,
    processed: Arc<AtomicU64>,
    handler_errors: Arc<AtomicU64>,
    stop: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl QueueConsumer {
    pub fn new(
        client: Client,
        config: QueueConfig,
        handler: Arc<dyn MessageHandler>,
        registry: Registry<bool>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            handler,
            registry,
            running: Arc::new(AtomicBool::new(false)),
            processed: Arc::new(AtomicU64::new(0)),
            handler_errors: Arc::new(AtomicU64::new(0)),
            stop: CancellationToken::new(),
            workers: Vec::new(),
        })
    }

    /// Total messages for which a delete has been issued.
    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Total handler errors observed. Counted for observability; never
    /// propagated — a failing handler leaves its message undeleted for
    /// redelivery instead of tearing down the consumer.
    pub fn handler_error_count(&self) -> u64 {
        self.handler_errors.load(Ordering::Acquire)
    }

    /// Launch `pool_size` receive loops.
    pub fn start(&mut self) {
        self.running.store(true, Ordering::Release);
        if let Some(name) = &self.config.worker_name {
            self.registry.insert(name.clone(), true);
        }

        for worker_id in 0..self.config.pool_size {
            let client = self.client.clone();
            let queue_url = self.config.queue_url.clone();
            let batch = self.config.max_receive_batch;
            let long_poll = self.config.long_poll_seconds;
            let handler = Arc::clone(&self.handler);
            let processed = Arc::clone(&self.processed);
            let handler_errors = Arc::clone(&self.handler_errors);
            let stop = self.stop.clone();

            let handle = tokio::spawn(async move {
                receive_loop(
                    worker_id,
                    client,
                    queue_url,
                    batch,
                    long_poll,
                    handler,
                    processed,
                    handler_errors,
                    stop,
                )
                .await;
            });
            self.workers.push(handle);
        }
    }

    /// Cancel all receive loops. Idempotent.
    pub fn stop(&mut self) {
        self.stop.cancel();
        self.running.store(false, Ordering::Release);
        if let Some(name) = &self.config.worker_name {
            self.registry.insert(name.clone(), false);
        }
        for handle in self.workers.drain(..) {
            handle.abort();
        }
    }

    /// `UP` iff running and an attribute-read against the queue succeeds.
    pub async fn health_check(&self) -> bool {
        if !self.running.load(Ordering::Acquire) {
            return false;
        }
        self.client
            .get_queue_attributes()
            .queue_url(&self.config.queue_url)
            .send()
            .await
            .is_ok()
    }
}

#[allow(clippy::too_many_arguments)]
async fn receive_loop(
    worker_id: usize,
    client: Client,
    queue_url: String,
    batch: i32,
    long_poll: i32,
    handler: Arc<dyn MessageHandler>,
    processed: Arc<AtomicU64>,
    handler_errors: Arc<AtomicU64>,
    stop: CancellationToken,
) {
    loop {
        let receive = client
            .receive_message()
            .queue_url(&queue_url)
            .max_number_of_messages(batch)
            .wait_time_seconds(long_poll);

        let outcome = tokio::select! {
            result = receive.send() => result,
            _ = stop.cancelled() => return,
        };

        let messages = match outcome {
            Ok(output) => output.messages.unwrap_or_default(),
            Err(e) => {
                warn!(worker_id, error = %e, "queue receive failed");
                tokio::select! {
                    _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
                    _ = stop.cancelled() => return,
                }
                continue;
            }
        };

        for message in messages {
            let client = client.clone();
            let queue_url = queue_url.clone();
            let handler = Arc::clone(&handler);
            let processed = Arc::clone(&processed);
            let handler_errors = Arc::clone(&handler_errors);

            tokio::spawn(async move {
                let Some(body) = message.body else { return };
                let Some(receipt_handle) = message.receipt_handle else { return };

                match handler.handle(body).await {
                    Ok(()) => {
                        if let Err(e) = client
                            .delete_message()
                            .queue_url(&queue_url)
                            .receipt_handle(&receipt_handle)
                            .send()
                            .await
                        {
                            warn!(error = %e, "failed to delete processed message");
                            return;
                        }
                        processed.fetch_add(1, Ordering::AcqRel);
                        debug!("message processed and deleted");
                    }
                    Err(e) => {
                        handler_errors.fetch_add(1, Ordering::AcqRel);
                        warn!(error = %e, "handler failed; message left for redelivery");
                    }
                }
            });
        }
    }
}
