//! An in-memory, `Arc<RwLock<HashMap<..>>>`-backed stand-in for a KV store.
//!
//! [`coord_kv::KvClient`] wraps a concrete `redis::aio::ConnectionManager`
//! and is not a trait, so this is not a drop-in substitute for it — lock,
//! rate-limiter and pub/sub primitives that take a `KvClient` still need a
//! live Redis for integration coverage (see the `#[ignore]`-gated tests in
//! each crate). `FakeKv` exists for unit-testing application code written
//! against a cache-shaped dependency, the way the platform's own
//! `MockCacheProvider` stands in for its cache trait.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory key/value store with TTL semantics approximating a real cache.
#[derive(Clone, Default)]
pub struct FakeKv {
    store: Arc<RwLock<HashMap<String, Entry>>>,
}

impl FakeKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut store = self.store.write();
        match store.get(key) {
            Some(entry) if entry.expires_at.is_some_and(|at| at <= Instant::now()) => {
                store.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.store.write().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().remove(key).is_some()
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    pub async fn incr(&self, key: &str, delta: i64) -> i64 {
        let mut store = self.store.write();
        let current = store
            .get(key)
            .and_then(|e| e.value.parse::<i64>().ok())
            .unwrap_or(0);
        let next = current + delta;
        store.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: None,
            },
        );
        next
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn clear(&self) {
        self.store.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let kv = FakeKv::new();
        kv.set("a", "1", None).await;
        assert_eq!(kv.get("a").await, Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let kv = FakeKv::new();
        kv.set("a", "1", None).await;
        assert!(kv.delete("a").await);
        assert_eq!(kv.get("a").await, None);
        assert!(!kv.delete("a").await);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let kv = FakeKv::new();
        kv.set("a", "1", Some(Duration::from_millis(10))).await;
        assert!(kv.exists("a").await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!kv.exists("a").await);
    }

    #[tokio::test]
    async fn test_incr() {
        let kv = FakeKv::new();
        assert_eq!(kv.incr("counter", 1).await, 1);
        assert_eq!(kv.incr("counter", 1).await, 2);
        assert_eq!(kv.incr("counter", -1).await, 1);
    }
}
