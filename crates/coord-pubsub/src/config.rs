//! Pub/Sub configuration and the subscription invariant.

use std::time::Duration;

use coord_common::config::RedisConnectionConfig;

use crate::Error;

/// Shared connection + namespacing options for both publisher and subscriber.
#[derive(Debug, Clone)]
pub struct PubSubConfig {
    pub connection: RedisConnectionConfig,
    /// Prepended to every channel name: `"<namespace>::<channel>"`.
    pub channel_namespace: String,
}

impl PubSubConfig {
    pub fn new(connection: RedisConnectionConfig, channel_namespace: impl Into<String>) -> Self {
        Self {
            connection,
            channel_namespace: channel_namespace.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.connection
            .validate()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        if self.channel_namespace.trim().is_empty() {
            return Err(Error::Configuration(
                "channel_namespace must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// What a subscriber listens for. Exactly one variant is ever active for a
/// given subscriber — encoded here as an enum rather than two optional
/// lists, so "both populated" and "neither populated" are unrepresentable.
#[derive(Debug, Clone)]
pub enum Subscription {
    Channels(Vec<String>),
    Patterns(Vec<String>),
}

impl Subscription {
    pub fn is_empty(&self) -> bool {
        match self {
            Subscription::Channels(c) => c.is_empty(),
            Subscription::Patterns(p) => p.is_empty(),
        }
    }
}

/// Subscriber worker-pool and reconnect behavior.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub subscription: Subscription,
    /// Number of concurrent worker tasks, each holding its own pub/sub
    /// connection over the same subscription.
    pub pool_size: usize,
    pub reconnect_delay: Duration,
    /// Consecutive failed reconnects before a worker gives up and reports
    /// DOWN. Resets to zero on a successful re-subscribe.
    pub max_reconnect_attempts: u32,
}

impl SubscriberConfig {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            pool_size: 1,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_attempts: 10,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.subscription.is_empty() {
            return Err(Error::Configuration(
                "subscription must name at least one channel or pattern".into(),
            ));
        }
        if self.pool_size == 0 {
            return Err(Error::Configuration("pool_size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_subscription() {
        let config = SubscriberConfig::new(Subscription::Channels(vec![]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_pool_size() {
        let config = SubscriberConfig::new(Subscription::Channels(vec!["a".into()]))
            .with_pool_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_patterns() {
        let config = SubscriberConfig::new(Subscription::Patterns(vec!["news.*".into()]));
        assert!(config.validate().is_ok());
    }
}
