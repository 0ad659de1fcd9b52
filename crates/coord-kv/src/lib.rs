//! Typed wrapper over a Redis-compatible key/value store.
//!
//! Every other primitive in this toolkit (locks, rate limiters, pub/sub,
//! queue workers) is built on a shared [`KvClient`]. The client owns the
//! connection pool; primitives borrow it by reference and must not outlive
//! it.

mod client;
mod error;

pub use client::{KvClient, KvConfig, KvHealth};
pub use error::Error;
