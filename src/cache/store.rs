//! Feed cache storage.
//!
//! Each entry is a rendered response snapshot with an expiry instant. An
//! entry is either absent or populated; expiry and flushes drop it back to
//! absent, so a stale body is never served.

use std::sync::RwLock;
use std::time::Instant;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::keys::FeedKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A populated cache entry: rendered bytes plus the instant they expire.
#[derive(Clone)]
pub struct CachedFeed {
    pub body: Bytes,
    pub content_type: String,
    expires_at: Instant,
}

impl CachedFeed {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// TTL-boxed snapshot store for the global feed.
pub struct FeedCache {
    config: CacheConfig,
    entries: RwLock<LruCache<FeedKey, CachedFeed>>,
}

impl FeedCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = RwLock::new(LruCache::new(config.entry_limit_non_zero()));
        Self { config, entries }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetch a fresh entry. An expired entry is dropped on the way out, so
    /// the next read observes an empty slot.
    pub fn get(&self, key: &FeedKey) -> Option<CachedFeed> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key).cloned() {
            Some(entry) if entry.is_fresh(now) => {
                counter!("vireo_feed_cache_hit_total").increment(1);
                Some(entry)
            }
            Some(_) => {
                entries.pop(key);
                counter!("vireo_feed_cache_miss_total").increment(1);
                None
            }
            None => {
                counter!("vireo_feed_cache_miss_total").increment(1);
                None
            }
        }
    }

    pub fn set(&self, key: FeedKey, body: Bytes, content_type: String) {
        let entry = CachedFeed {
            body,
            content_type,
            expires_at: Instant::now() + self.config.ttl(),
        };
        rw_write(&self.entries, SOURCE, "set").put(key, entry);
    }

    /// Drop every entry. Last-writer-wins under concurrent flushes; the
    /// store recomputes from persistence on the next read.
    pub fn flush_all(&self) {
        rw_write(&self.entries, SOURCE, "flush_all").clear();
        counter!("vireo_feed_cache_flush_total").increment(1);
    }

    /// Invalidation hook for post creation.
    pub fn on_post_created(&self) {
        if self.config.flush_on_create() {
            self.flush_all();
        }
    }

    /// Invalidation hook for post deletion. The observed default keeps the
    /// stale window and lets the TTL expire the entry.
    pub fn on_post_deleted(&self) {
        if self.config.flush_on_delete() {
            self.flush_all();
        }
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::thread::sleep;
    use std::time::Duration;

    use super::super::config::InvalidationPolicy;
    use super::*;

    fn cache_with(config: CacheConfig) -> FeedCache {
        FeedCache::new(config)
    }

    fn body(text: &str) -> Bytes {
        Bytes::from(text.to_string())
    }

    #[test]
    fn entry_round_trip() {
        let cache = cache_with(CacheConfig::default());

        assert!(cache.get(&FeedKey::Global).is_none());

        cache.set(FeedKey::Global, body("feed"), "application/json".into());

        let entry = cache.get(&FeedKey::Global).expect("populated entry");
        assert_eq!(entry.body, body("feed"));
        assert_eq!(entry.content_type, "application/json");
    }

    #[test]
    fn expired_entry_reads_as_empty() {
        let cache = cache_with(CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        });

        cache.set(FeedKey::Global, body("feed"), "application/json".into());
        sleep(Duration::from_millis(5));
        assert!(cache.get(&FeedKey::Global).is_none());
    }

    #[test]
    fn flush_empties_every_key() {
        let cache = cache_with(CacheConfig {
            key_by_page: true,
            ..Default::default()
        });

        cache.set(FeedKey::GlobalPage(1), body("one"), "application/json".into());
        cache.set(FeedKey::GlobalPage(2), body("two"), "application/json".into());
        assert_eq!(cache.len(), 2);

        cache.flush_all();

        assert!(cache.is_empty());
        assert!(cache.get(&FeedKey::GlobalPage(1)).is_none());
        assert!(cache.get(&FeedKey::GlobalPage(2)).is_none());
    }

    #[test]
    fn post_created_flushes_under_default_policy() {
        let cache = cache_with(CacheConfig::default());
        cache.set(FeedKey::Global, body("stale"), "application/json".into());

        cache.on_post_created();

        assert!(cache.get(&FeedKey::Global).is_none());
    }

    #[test]
    fn post_deleted_keeps_entry_under_default_policy() {
        let cache = cache_with(CacheConfig::default());
        cache.set(FeedKey::Global, body("stale"), "application/json".into());

        cache.on_post_deleted();

        assert!(cache.get(&FeedKey::Global).is_some());
    }

    #[test]
    fn ttl_only_policy_ignores_create() {
        let cache = cache_with(CacheConfig {
            policy: InvalidationPolicy::TtlOnly,
            ..Default::default()
        });
        cache.set(FeedKey::Global, body("held"), "application/json".into());

        cache.on_post_created();

        assert!(cache.get(&FeedKey::Global).is_some());
    }

    #[test]
    fn both_policy_flushes_on_delete() {
        let cache = cache_with(CacheConfig {
            policy: InvalidationPolicy::Both,
            ..Default::default()
        });
        cache.set(FeedKey::Global, body("held"), "application/json".into());

        cache.on_post_deleted();

        assert!(cache.get(&FeedKey::Global).is_none());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let cache = cache_with(CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.write().expect("entries lock acquired");
            panic!("poison entries lock");
        }));

        cache.set(FeedKey::Global, body("after"), "application/json".into());
        assert!(cache.get(&FeedKey::Global).is_some());
    }
}
