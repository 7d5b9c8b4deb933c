//! Translation metrics and observability.
//!
//! Each gateway owns one `TranslationMetrics`, so independently configured
//! gateways (and tests) never share counters.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Requests answered from the cache
    cache_hits: AtomicUsize,

    /// Requests that missed the cache and went to the providers
    cache_misses: AtomicUsize,

    /// Provider attempts (one per provider in the pipeline, retries excluded)
    api_calls: AtomicUsize,

    /// Provider attempts that failed
    api_failures: AtomicUsize,

    /// Rate-limit signals received
    rate_limit_hits: AtomicUsize,

    /// Requests skipped because the cooldown was active
    cooldown_skips: AtomicUsize,

    /// Requests returned untouched by a short-circuit (disabled, same language, blank)
    passthroughs: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit(&self) {
        self.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cooldown_skip(&self) {
        self.cooldown_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passthrough(&self) {
        self.passthroughs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn rate_limit_hits(&self) -> usize {
        self.rate_limit_hits.load(Ordering::Relaxed)
    }

    pub fn cooldown_skips(&self) -> usize {
        self.cooldown_skips.load(Ordering::Relaxed)
    }

    pub fn passthroughs(&self) -> usize {
        self.passthroughs.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            rate_limit_hits: self.rate_limit_hits(),
            cooldown_skips: self.cooldown_skips(),
            passthroughs: self.passthroughs(),
        }
    }
}

/// Snapshot of translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub rate_limit_hits: usize,
    pub cooldown_skips: usize,
    pub passthroughs: usize,
}
