//! Publish/subscribe fan-out over namespaced channels, with a
//! self-healing multi-worker subscriber.
//!
//! [`Subscription::Channels`] and [`Subscription::Patterns`] are mutually
//! exclusive by construction — there is no way to build a subscriber that
//! listens to both, matching the invariant that calling one discards the
//! other.

mod config;
mod error;
mod publisher;
mod subscriber;

pub use config::{PubSubConfig, Subscription, SubscriberConfig};
pub use error::Error;
pub use publisher::Publisher;
pub use subscriber::{MessageHandler, Subscriber};
