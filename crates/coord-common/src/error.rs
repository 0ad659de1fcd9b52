//! Shared error primitives.
//!
//! Each primitive crate defines its own `thiserror`-derived `Error` enum
//! scoped to its own failure modes (a cache error is not a queue error);
//! this module only holds the handful of error shapes common to all of
//! them — configuration failures and the retryability/signature
//! conventions described in spec §7.

use thiserror::Error;

/// Errors shared by configuration and telemetry setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation failure at construction time. Fatal; abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Classifies an error for dispatcher-level handling, per spec §7.
///
/// Contention errors are expected outcomes, not faults, and carry a
/// distinct machine-readable signature substring so callers can
/// classify rejections without matching on error variants directly.
pub trait ErrorKind {
    /// True if a caller may reasonably retry the operation.
    fn is_retryable(&self) -> bool;

    /// Machine-readable signature substring, when this error represents
    /// an expected contention outcome (lock held, rate limited). `None`
    /// for transport/configuration/ownership errors.
    fn signature(&self) -> Option<&'static str>;
}
