//! Rate limiter configuration.

use std::time::Duration;

use crate::Error;

/// Options record for a rate-limiter bucket.
///
/// At least one of `max_active`, `max_tps`, `max_tpm` must be non-zero; a
/// zero value on any one axis means "unlimited" for that axis and disables
/// both its check and its state update.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Key namespace; derived keys are `"<namespace>::<base_key>[::<partition>]::{active,tps,tpm}"`.
    pub namespace: String,
    /// Base key identifying this limiter.
    pub base_key: String,
    /// Optional name this limiter registers under in the metrics registry.
    pub cache_name: Option<String>,
    /// Concurrent-transaction limit. `0` disables the axis.
    pub max_active: u64,
    /// Per-second limit. `0` disables the axis.
    pub max_tps: u64,
    /// Per-minute limit. `0` disables the axis.
    pub max_tpm: u64,
    /// TTL on the active counter is `2 × transaction_ttl`.
    pub transaction_ttl: Duration,
    /// Retry instead of returning the contention error immediately.
    pub wait_on_limit: bool,
    /// Upper bound on total time spent waiting when `wait_on_limit = true`.
    pub wait_timeout: Duration,
    /// Sleep between wait attempts.
    pub retry_delay: Duration,
}

impl RateLimiterConfig {
    /// Start a config with all axes disabled; combine with `with_*` axis
    /// setters, e.g. `RateLimiterConfig::new("coord", "api").with_max_tpm(100)`.
    pub fn new(namespace: impl Into<String>, base_key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            base_key: base_key.into(),
            cache_name: None,
            max_active: 0,
            max_tps: 0,
            max_tpm: 0,
            transaction_ttl: Duration::from_secs(30),
            wait_on_limit: false,
            wait_timeout: Duration::from_secs(5),
            retry_delay: Duration::from_millis(100),
        }
    }

    pub fn with_max_active(mut self, max_active: u64) -> Self {
        self.max_active = max_active;
        self
    }

    pub fn with_max_tps(mut self, max_tps: u64) -> Self {
        self.max_tps = max_tps;
        self
    }

    pub fn with_max_tpm(mut self, max_tpm: u64) -> Self {
        self.max_tpm = max_tpm;
        self
    }

    pub fn with_transaction_ttl(mut self, ttl: Duration) -> Self {
        self.transaction_ttl = ttl;
        self
    }

    pub fn with_wait_on_limit(mut self, wait: bool) -> Self {
        self.wait_on_limit = wait;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    /// Validate the bundle. Hard failures; construction must not proceed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_active == 0 && self.max_tps == 0 && self.max_tpm == 0 {
            return Err(Error::Configuration(
                "at least one of max_active, max_tps, max_tpm must be non-zero".into(),
            ));
        }
        if self.namespace.trim().is_empty() || self.base_key.trim().is_empty() {
            return Err(Error::Configuration(
                "namespace and base_key must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_all_axes_disabled() {
        let config = RateLimiterConfig::new("ns", "api");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_single_axis() {
        let config = RateLimiterConfig::new("ns", "api").with_max_tpm(100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_base_key() {
        let config = RateLimiterConfig::new("ns", "").with_max_active(5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_combines_axes() {
        let config = RateLimiterConfig::new("ns", "api")
            .with_max_active(5)
            .with_max_tps(10)
            .with_max_tpm(100);
        assert_eq!(config.max_active, 5);
        assert_eq!(config.max_tps, 10);
        assert_eq!(config.max_tpm, 100);
    }
}
