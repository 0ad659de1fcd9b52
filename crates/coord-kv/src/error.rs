//! KV client error type.

use coord_common::ErrorKind;
use thiserror::Error;

/// Errors produced by the KV client.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time validation failure. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The store was unreachable or a command failed at the transport level.
    #[error("kv transport error: {0}")]
    Transport(#[from] redis::RedisError),

    /// A value stored at a key could not be deserialized into the requested type.
    #[error("kv deserialization error for key {key}: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ErrorKind for Error {
    fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    fn signature(&self) -> Option<&'static str> {
        None
    }
}
