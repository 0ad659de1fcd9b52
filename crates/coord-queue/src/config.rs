//! Queue worker configuration.

use crate::Error;

/// Options record for one queue worker.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// The queue's URL (already resolved by name against the queue
    /// service, e.g. via `GetQueueUrl`, at the call site).
    pub queue_url: String,
    /// Messages requested per receive call. Must be in `1..=10`.
    pub max_receive_batch: i32,
    /// Long-poll wait. Must be in `1..=20` seconds.
    pub long_poll_seconds: i32,
    /// Concurrent receive loops. Must be `>= 1`.
    pub pool_size: usize,
    /// Optional name this worker registers under in the Worker Registry.
    pub worker_name: Option<String>,
}

impl QueueConfig {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            max_receive_batch: 10,
            long_poll_seconds: 20,
            pool_size: 1,
            worker_name: None,
        }
    }

    pub fn with_max_receive_batch(mut self, batch: i32) -> Self {
        self.max_receive_batch = batch;
        self
    }

    pub fn with_long_poll_seconds(mut self, seconds: i32) -> Self {
        self.long_poll_seconds = seconds;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = Some(name.into());
        self
    }

    /// Validate the bundle. Hard failures; construction must not proceed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.queue_url.trim().is_empty() {
            return Err(Error::Configuration("queue_url must not be empty".into()));
        }
        if !(1..=10).contains(&self.max_receive_batch) {
            return Err(Error::Configuration(
                "max_receive_batch must be in 1..=10".into(),
            ));
        }
        if !(1..=20).contains(&self.long_poll_seconds) {
            return Err(Error::Configuration(
                "long_poll_seconds must be in 1..=20".into(),
            ));
        }
        if self.pool_size == 0 {
            return Err(Error::Configuration("pool_size must be positive".into()));
        }
        Ok(())
    }
}
