//! Lock engine error type.

use coord_common::ErrorKind;
use thiserror::Error;

/// Errors produced by the lock engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time validation failure. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying KV store was unreachable or a command failed.
    #[error(transparent)]
    Kv(#[from] coord_kv::Error),

    /// Retry budget exhausted without acquiring the lock. An expected
    /// contention outcome, not a fault.
    #[error("lock not acquired for key {key} after {attempts} attempt(s)")]
    NotAcquired { key: String, attempts: u32 },

    /// `unlock`/`refresh` found a different fencing value at the key —
    /// this client is no longer (or never was) the holder.
    #[error("lock was not held by this client for key {key}")]
    NotHeld { key: String },

    /// The caller's cancellation handle fired while waiting to acquire.
    #[error("lock acquisition cancelled for key {key}")]
    Cancelled { key: String },
}

impl ErrorKind for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Kv(e) => e.is_retryable(),
            Error::NotAcquired { .. } => true,
            Error::NotHeld { .. } | Error::Cancelled { .. } | Error::Configuration(_) => false,
        }
    }

    fn signature(&self) -> Option<&'static str> {
        match self {
            Error::NotAcquired { .. } => Some("not acquired"),
            _ => None,
        }
    }
}
