//! Pub/Sub error type.

use coord_common::ErrorKind;
use thiserror::Error;

/// Errors produced by the publisher and subscriber.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time validation failure. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying KV/pub-sub transport was unreachable or a command failed.
    #[error("pub/sub transport error: {0}")]
    Transport(#[from] redis::RedisError),

    /// A JSON payload could not be serialized or deserialized.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The subscriber exhausted `max_reconnect_attempts` without
    /// re-establishing its stream.
    #[error("subscriber exhausted reconnect attempts for {namespace}")]
    ReconnectExhausted { namespace: String },
}

impl ErrorKind for Error {
    fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    fn signature(&self) -> Option<&'static str> {
        None
    }
}
