//! Process-wide named-entry registry.
//!
//! `coord-lock`, `coord-ratelimit` and `coord-queue` each keep a registry of
//! live handles (held locks, partitioned limiters, worker pools) so a
//! `coord-health` observer can enumerate and report on them without every
//! call site threading a reference through. Mirrors the
//! `Arc<RwLock<HashMap<...>>>` shape the platform's metrics and mock
//! providers use.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe, clonable map of named entries of type `T`.
///
/// Cloning a `Registry` clones the `Arc`, not the map — all clones observe
/// the same underlying entries.
#[derive(Debug)]
pub struct Registry<T> {
    entries: Arc<RwLock<HashMap<String, T>>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace the entry under `name`, returning the previous
    /// value if one was present.
    pub fn insert(&self, name: impl Into<String>, value: T) -> Option<T> {
        self.entries.write().insert(name.into(), value)
    }

    /// Remove the entry under `name`, returning it if present.
    pub fn remove(&self, name: &str) -> Option<T> {
        self.entries.write().remove(name)
    }

    /// Look up a clone of the entry under `name`.
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.read().get(name).cloned()
    }

    /// Snapshot all entries as `(name, value)` pairs.
    pub fn snapshot(&self) -> Vec<(String, T)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let registry: Registry<u32> = Registry::new();
        assert_eq!(registry.insert("a", 1), None);
        assert_eq!(registry.get("a"), Some(1));
    }

    #[test]
    fn test_insert_replaces_previous() {
        let registry: Registry<u32> = Registry::new();
        registry.insert("a", 1);
        assert_eq!(registry.insert("a", 2), Some(1));
        assert_eq!(registry.get("a"), Some(2));
    }

    #[test]
    fn test_remove() {
        let registry: Registry<u32> = Registry::new();
        registry.insert("a", 1);
        assert_eq!(registry.remove("a"), Some(1));
        assert_eq!(registry.get("a"), None);
    }

    #[test]
    fn test_snapshot_and_len() {
        let registry: Registry<u32> = Registry::new();
        registry.insert("a", 1);
        registry.insert("b", 2);
        assert_eq!(registry.len(), 2);
        let mut snapshot = registry.snapshot();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(snapshot, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_clone_shares_storage() {
        let registry: Registry<u32> = Registry::new();
        let clone = registry.clone();
        registry.insert("a", 1);
        assert_eq!(clone.get("a"), Some(1));
    }
}
