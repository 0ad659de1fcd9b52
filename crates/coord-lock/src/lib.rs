//! Lease-based distributed mutual exclusion.
//!
//! Four flavors differ only in their [`LockConfig`] parameter bundle —
//! single-attempt, retry, persistent, and scheduled-task. Ownership is
//! proven by a monotonic fencing value compared server-side inside an
//! atomic script, so `unlock`/`refresh` can never act on a lease this
//! instance no longer holds.

mod config;
mod engine;
mod error;
mod lease;
mod scripts;

pub use config::LockConfig;
pub use engine::Lock;
pub use error::Error;
pub use lease::LeaseGuard;

/// Registry of cache-name to acquired-flag, consulted by the Health
/// Observer. Share one instance across every [`Lock`] in a process.
pub type LockRegistry = coord_common::Registry<bool>;
