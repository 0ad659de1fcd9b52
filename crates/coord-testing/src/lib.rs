//! Test doubles and property tests shared across the coordination toolkit's
//! crates.

mod fake_kv;
mod fixtures;
mod sliding_window;

pub use fake_kv::FakeKv;
pub use fixtures::{test_lock_config, test_persistent_lock_config, test_rate_limiter_config};
pub use sliding_window::{PartitionedWindow, SlidingWindow};
