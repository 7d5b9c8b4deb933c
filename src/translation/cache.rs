//! In-memory TTL cache for translation results.
//!
//! Both successful translations (long TTL) and failed lookups (the original
//! text, short TTL) live here, so every entry carries its own lifetime. The
//! cache is bounded; once full, the least recently used entries are evicted.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Cache identity of a translation request: `(source, target, text)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    source_lang: String,
    target_lang: String,
    text: String,
}

impl CacheKey {
    pub fn new(source_lang: &str, target_lang: &str, text: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedText {
    value: String,
    ttl: Duration,
}

/// Expire each entry after the TTL it was stored with; overwrites restart the clock.
struct PerEntryTtl;

impl Expiry<CacheKey, CachedText> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CachedText,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &CachedText,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct TranslationCache {
    entries: Cache<CacheKey, CachedText>,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity.max(1) as u64)
                .eviction_policy(EvictionPolicy::lru())
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    /// Fresh value for `key`; expired entries are never returned.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|cached| cached.value)
    }

    /// Store `value` for `ttl`, replacing any previous entry for `key`.
    pub fn insert(&self, key: CacheKey, value: String, ttl: Duration) {
        self.entries.insert(key, CachedText { value, ttl });
    }

    /// Number of stored entries, after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
