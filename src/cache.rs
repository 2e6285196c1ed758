//! Cache port and the in-memory implementation backing it.
//!
//! Cached values are stored as JSON so the cache stays agnostic of the shapes
//! it holds. Entries carry a TTL and a set of tags; invalidation works by tag
//! so one upstream change can evict every derived value at once.
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// Tag shared by every value derived from one channel.
pub fn channel_tag(slug: &str) -> String {
    format!("content-channel-{slug}")
}

#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Look up a fresh entry. Expired entries behave like misses.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value under `key` for `ttl`, tagged for group invalidation.
    async fn put(&self, key: &str, value: Value, ttl: Duration, tags: &[String]);

    /// Drop every entry carrying `tag`. Returns how many were dropped.
    async fn invalidate_tag(&self, tag: &str) -> usize;
}

struct Entry {
    value: Value,
    expires_at: Instant,
    tags: Vec<String>,
}

/// Process-local cache. Eviction is lazy: expired entries are removed when
/// read, or replaced when rewritten.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
        }
        // Re-check under the removal to avoid dropping a concurrent rewrite.
        self.entries
            .remove_if(key, |_, entry| entry.expires_at <= Instant::now());
        None
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration, tags: &[String]) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
                tags: tags.to_vec(),
            },
        );
    }

    async fn invalidate_tag(&self, tag: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let dropped = before.saturating_sub(self.entries.len());
        debug!(%tag, dropped, "cache invalidation");
        dropped
    }
}
