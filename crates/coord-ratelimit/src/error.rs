//! Rate limiter error type.

use coord_common::ErrorKind;
use thiserror::Error;

/// Errors produced by the rate limiter.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction-time validation failure. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The underlying KV store was unreachable or a command failed.
    #[error(transparent)]
    Kv(#[from] coord_kv::Error),

    /// The concurrent-transaction axis (`max_active`) is at capacity.
    #[error("active limit reached")]
    ActiveLimitReached,

    /// The per-second axis (`max_tps`) is at capacity.
    #[error("rate limit exceeded: too many transactions per second")]
    TpsLimitReached,

    /// The per-minute axis (`max_tpm`) is at capacity.
    #[error("rate limit exceeded: too many transactions per minute")]
    TpmLimitReached,

    /// `wait_on_limit = true` exhausted `wait_timeout` without acquiring.
    #[error("timed out after {0:?} waiting to acquire")]
    WaitTimeout(std::time::Duration),

    /// The caller's cancellation handle fired while waiting to acquire.
    #[error("acquire cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn from_script_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Error::ActiveLimitReached),
            -1 => Some(Error::TpsLimitReached),
            -2 => Some(Error::TpmLimitReached),
            _ => None,
        }
    }
}

impl ErrorKind for Error {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Kv(_)
                | Error::ActiveLimitReached
                | Error::TpsLimitReached
                | Error::TpmLimitReached
                | Error::WaitTimeout(_)
        )
    }

    fn signature(&self) -> Option<&'static str> {
        match self {
            Error::ActiveLimitReached => Some("active"),
            Error::TpsLimitReached => Some("per second"),
            Error::TpmLimitReached => Some("per minute"),
            _ => None,
        }
    }
}
