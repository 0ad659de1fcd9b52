//! Lock configuration and the four preset flavors.

use std::time::Duration;

use crate::Error;

/// Options record for a single lock key.
///
/// Construct via [`LockConfig::single_attempt`], [`LockConfig::retry`],
/// [`LockConfig::persistent`], or [`LockConfig::scheduled_task`] — the four
/// flavors differ only in this parameter bundle.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Lease TTL. Also the time a crashed holder's lease survives.
    pub ttl: Duration,
    /// Sleep between acquire attempts.
    pub retry_delay: Duration,
    /// Retries attempted after the first, when `infinite_retry` is false.
    pub max_retries: u32,
    /// Retry forever instead of giving up after `max_retries`.
    pub infinite_retry: bool,
    /// Tick interval for the auto-refresh worker.
    pub refresh_interval: Duration,
    /// Whether refresh errors are suppressed-and-retried (persistent) or
    /// terminal (non-persistent).
    pub persistent_refresh: bool,
    /// Key namespace; the full key is `"<namespace>::<key>"`.
    pub namespace: String,
    /// Optional name this lease registers under in the Lock Registry.
    pub cache_name: Option<String>,
}

impl LockConfig {
    /// Best-effort one-shot critical section: zero retries, no auto-refresh.
    pub fn single_attempt(namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            ttl,
            retry_delay: Duration::from_millis(100),
            max_retries: 0,
            infinite_retry: false,
            refresh_interval: ttl / 2,
            persistent_refresh: false,
            namespace: namespace.into(),
            cache_name: None,
        }
    }

    /// Bounded contention: up to `max_retries` retries after the first
    /// attempt, spaced by `retry_delay`. No auto-refresh; callers may call
    /// [`crate::LeaseGuard::refresh`] manually.
    pub fn retry(
        namespace: impl Into<String>,
        ttl: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            ttl,
            retry_delay,
            max_retries,
            infinite_retry: false,
            refresh_interval: ttl / 2,
            persistent_refresh: false,
            namespace: namespace.into(),
            cache_name: None,
        }
    }

    /// Long-running leader work: infinite retry, indefinite auto-refresh
    /// that suppresses and retries transient refresh failures.
    pub fn persistent(
        namespace: impl Into<String>,
        ttl: Duration,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            ttl,
            retry_delay: Duration::from_millis(200),
            max_retries: 0,
            infinite_retry: true,
            refresh_interval,
            persistent_refresh: true,
            namespace: namespace.into(),
            cache_name: None,
        }
    }

    /// Cron singleton across replicas. Identical shape to `persistent`;
    /// kept as a distinct constructor so call sites self-document intent
    /// (see the scheduled-singleton composition).
    pub fn scheduled_task(
        namespace: impl Into<String>,
        ttl: Duration,
        refresh_interval: Duration,
    ) -> Self {
        Self::persistent(namespace, ttl, refresh_interval)
    }

    /// Attach a name this lease registers under in the Lock Registry.
    pub fn with_cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    /// Validate the bundle. Hard failures; construction must not proceed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ttl.is_zero() {
            return Err(Error::Configuration("ttl must be positive".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::Configuration("namespace must not be empty".into()));
        }
        if (self.persistent_refresh || self.max_retries > 0) && self.refresh_interval.is_zero() {
            return Err(Error::Configuration(
                "refresh_interval must be positive when refresh is used".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_attempt_has_no_retries() {
        let config = LockConfig::single_attempt("ns", Duration::from_secs(10));
        assert_eq!(config.max_retries, 0);
        assert!(!config.infinite_retry);
        assert!(!config.persistent_refresh);
    }

    #[test]
    fn test_persistent_is_infinite_and_auto_refreshing() {
        let config = LockConfig::persistent("ns", Duration::from_secs(10), Duration::from_secs(2));
        assert!(config.infinite_retry);
        assert!(config.persistent_refresh);
    }

    #[test]
    fn test_scheduled_task_matches_persistent_shape() {
        let a = LockConfig::persistent("ns", Duration::from_secs(10), Duration::from_secs(2));
        let b = LockConfig::scheduled_task("ns", Duration::from_secs(10), Duration::from_secs(2));
        assert_eq!(a.infinite_retry, b.infinite_retry);
        assert_eq!(a.persistent_refresh, b.persistent_refresh);
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = LockConfig::single_attempt("ns", Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_namespace() {
        let config = LockConfig::single_attempt("", Duration::from_secs(10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_cache_name() {
        let config =
            LockConfig::single_attempt("ns", Duration::from_secs(10)).with_cache_name("job-a");
        assert_eq!(config.cache_name.as_deref(), Some("job-a"));
    }
}
