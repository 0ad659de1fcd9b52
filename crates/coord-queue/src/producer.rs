//! Pooled sender: single-message and chunked batch send.

use aws_sdk_sqs::types::SendMessageBatchRequestEntry;
use aws_sdk_sqs::Client;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::Error;

/// One outbound entry for a batch send, carrying the caller's own id so
/// results can be attributed back to it.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub id: String,
    pub body: String,
}

/// Aggregated batch-send outcome, preserving caller-supplied ids.
#[derive(Debug, Clone, Default)]
pub struct BatchSendResult {
    pub successful: Vec<String>,
    pub failed: Vec<String>,
}

/// Sends single messages and chunked batches (chunks of at most 10,
/// dispatched concurrently) to one queue.
#[derive(Clone)]
pub struct QueueProducer {
    client: Client,
    queue_url: String,
}

impl QueueProducer {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Send one message, returning the queue-assigned message id.
    pub async fn send_message(&self, body: impl Into<String>) -> Result<String, Error> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.into()))?;
        Ok(output.message_id.unwrap_or_default())
    }

    /// Serialize `value` as JSON and send it.
    pub async fn send_message_json<T: Serialize>(&self, value: &T) -> Result<String, Error> {
        let body = serde_json::to_string(value)?;
        self.send_message(body).await
    }

    /// Send a batch, chunked into groups of at most 10 entries dispatched
    /// concurrently. Results are aggregated preserving caller ids.
    pub async fn send_message_batch(&self, messages: Vec<OutboundMessage>) -> BatchSendResult {
        let chunks: Vec<Vec<OutboundMessage>> = messages
            .chunks(10)
            .map(|chunk| chunk.to_vec())
            .collect();

        let futures = chunks.into_iter().map(|chunk| self.send_chunk(chunk));
        let chunk_results = join_all(futures).await;

        let mut result = BatchSendResult::default();
        for chunk in chunk_results {
            result.successful.extend(chunk.successful);
            result.failed.extend(chunk.failed);
        }
        result
    }

    /// Serialize each `(id, value)` pair as JSON and send as a batch.
    /// A serialization failure is reported as `failed` for that id without
    /// a network round-trip.
    pub async fn send_message_batch_json<T: Serialize>(
        &self,
        items: Vec<(String, T)>,
    ) -> BatchSendResult {
        let mut messages = Vec::with_capacity(items.len());
        let mut result = BatchSendResult::default();

        for (id, value) in items {
            match serde_json::to_string(&value) {
                Ok(body) => messages.push(OutboundMessage { id, body }),
                Err(e) => {
                    warn!(id, error = %e, "message serialization failed, skipping send");
                    result.failed.push(id);
                }
            }
        }

        let sent = self.send_message_batch(messages).await;
        result.successful.extend(sent.successful);
        result.failed.extend(sent.failed);
        result
    }

    async fn send_chunk(&self, chunk: Vec<OutboundMessage>) -> BatchSendResult {
        let entries: Vec<SendMessageBatchRequestEntry> = chunk
            .iter()
            .map(|message| {
                SendMessageBatchRequestEntry::builder()
                    .id(message.id.clone())
                    .message_body(message.body.clone())
                    .build()
                    .expect("id and message_body are always set")
            })
            .collect();

        let ids: Vec<String> = chunk.iter().map(|m| m.id.clone()).collect();

        match self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(entries))
            .send()
            .await
        {
            Ok(output) => {
                let successful = output
                    .successful
                    .into_iter()
                    .map(|entry| entry.id)
                    .collect();
                let failed = output.failed.into_iter().map(|entry| entry.id).collect();
                BatchSendResult { successful, failed }
            }
            Err(e) => {
                warn!(error = %e, count = ids.len(), "batch send request failed entirely");
                BatchSendResult {
                    successful: Vec::new(),
                    failed: ids,
                }
            }
        }
    }
}
