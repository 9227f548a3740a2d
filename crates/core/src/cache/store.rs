//! Process-wide map from resource key to [`CacheEntry`].

use super::CacheEntry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::Duration;

static GLOBAL: LazyLock<ResponseCache> = LazyLock::new(ResponseCache::new);

/// Shared response cache.
///
/// Cloning is cheap and every clone sees the same entries. Locks are only
/// held for the duration of a map operation, never across an await.
#[derive(Clone, Debug, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl ResponseCache {
    /// Create an empty, independent cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache instance shared by the whole process.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Look up `key`, returning the entry only if it is younger than `max_age`.
    pub fn get_fresh(&self, key: &str, max_age: Duration) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_fresh(max_age) {
            tracing::debug!(key, age_ms = entry.age().as_millis() as u64, "cache hit");
            Some(entry.clone())
        } else {
            tracing::debug!(key, age_ms = entry.age().as_millis() as u64, "cache entry stale");
            None
        }
    }

    /// Look up `key` regardless of age.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, payload: Value) -> CacheEntry {
        let entry = CacheEntry::new(key, payload);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), entry.clone());
        entry
    }

    /// Drop the entry for `key`, if any.
    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key)
    }

    /// Drop every entry. Intended for isolating test runs.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
