//! Queue worker error type.

use coord_common::ErrorKind;
use thiserror::Error;

/// Errors produced by the queue producer and consumer.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time validation failure. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The queue service was unreachable or an operation failed.
    #[error("queue transport error: {0}")]
    Transport(#[from] aws_sdk_sqs::Error),

    /// A message body could not be serialized at the marshalling step;
    /// reported without a network round-trip for that id.
    #[error("message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ErrorKind for Error {
    fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    fn signature(&self) -> Option<&'static str> {
        None
    }
}
