//! Best-effort translation gateway.
//!
//! `TranslationGateway::translate` never fails: every provider error, timeout
//! or panic degrades to returning the caller's original text. Successful
//! results are cached for a day, failures for a few minutes, and a rate-limit
//! answer from any provider silences all outbound calls for a cooldown window.

mod cache;
mod cooldown;
mod libretranslate;
mod metrics;
mod mymemory;
mod provider;

pub use cache::{CacheKey, TranslationCache};
pub use cooldown::CooldownState;
pub use libretranslate::LibreTranslate;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use mymemory::MyMemory;
pub use provider::{enforce_https, ProviderError, TranslationProvider};

use crate::config::Config;
use crate::i18n::{normalize_code, normalize_source, Language, LanguageRegistry, AUTO_DETECT};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long a successful translation is reused
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How long a failed lookup keeps returning the original text
pub const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(5 * 60);

/// Quiet period after any provider signals a rate limit
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Characters of input text shown in log lines
const LOG_PREVIEW_CHARS: usize = 50;

/// Anything that can localize text for page rendering.
#[async_trait]
pub trait Translate: Send + Sync {
    /// Translate `text`, returning the original on any failure.
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String;

    /// Language code → display name for the language selector.
    fn get_supported_languages(&self) -> BTreeMap<String, String>;
}

/// Tunables of one gateway instance.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub cache_ttl: Duration,
    pub negative_ttl: Duration,
    pub cooldown: Duration,
    pub request_timeout: Duration,
    pub cache_capacity: usize,
    pub retry: RetryConfig,
}

impl GatewayConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.translation_enabled,
            request_timeout: Duration::from_secs(config.translation_timeout_secs),
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = ttl;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_ttl: DEFAULT_CACHE_TTL,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
            cooldown: DEFAULT_COOLDOWN,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry: RetryConfig::provider_call(),
        }
    }
}

/// Point-in-time view of a gateway, served by the metrics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub enabled: bool,
    pub providers: Vec<&'static str>,
    pub cache_entries: usize,
    pub cooldown_active: bool,
    pub last_rate_limit_hit: Option<DateTime<Utc>>,
    pub metrics: MetricsReport,
}

pub struct TranslationGateway {
    settings: GatewayConfig,
    providers: Vec<Box<dyn TranslationProvider>>,
    cache: TranslationCache,
    cooldown: CooldownState,
    metrics: TranslationMetrics,
}

impl TranslationGateway {
    /// Gateway over an explicit provider pipeline, tried in order.
    pub fn new(settings: GatewayConfig, providers: Vec<Box<dyn TranslationProvider>>) -> Self {
        Self {
            cache: TranslationCache::new(settings.cache_capacity),
            cooldown: CooldownState::new(),
            metrics: TranslationMetrics::new(),
            settings,
            providers,
        }
    }

    /// Standard pipeline: the configured LibreTranslate endpoint (if any), then MyMemory.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_settings(config, GatewayConfig::from_config(config))
    }

    pub fn with_settings(config: &Config, settings: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for translation providers")?;

        let mut providers: Vec<Box<dyn TranslationProvider>> = Vec::new();

        if config.translation_api_url.trim().is_empty() {
            info!("No primary translation endpoint configured; using MyMemory only");
        } else {
            providers.push(Box::new(LibreTranslate::new(
                client.clone(),
                &config.translation_api_url,
                config.translation_api_key.clone(),
                settings.request_timeout,
            )));
        }

        providers.push(Box::new(MyMemory::new(
            client,
            &config.translation_fallback_url,
            settings.request_timeout,
        )));

        Ok(Self::new(settings, providers))
    }

    pub fn settings(&self) -> &GatewayConfig {
        &self.settings
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn cooldown(&self) -> &CooldownState {
        &self.cooldown
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn status(&self) -> GatewayStatus {
        GatewayStatus {
            enabled: self.settings.enabled,
            providers: self.provider_names(),
            cache_entries: self.cache.len(),
            cooldown_active: self.cooldown.is_active(self.settings.cooldown),
            last_rate_limit_hit: self.cooldown.last_hit(),
            metrics: self.metrics.report(),
        }
    }

    /// Ask the providers which languages they offer, falling back to the built-in table.
    pub async fn discover_languages(&self) -> BTreeMap<String, String> {
        let registry = LanguageRegistry::get();

        for provider in &self.providers {
            let Some(listing) = provider.languages().await else {
                continue;
            };

            let discovered: BTreeMap<String, String> = listing
                .into_iter()
                .filter_map(|(code, name)| {
                    let code = normalize_code(&code);
                    if code.is_empty() {
                        return None;
                    }
                    let name = registry
                        .get_by_code(&code)
                        .map(|lang| lang.name.to_string())
                        .unwrap_or(name);
                    Some((code, name))
                })
                .collect();

            if !discovered.is_empty() {
                debug!("{} advertised {} languages", provider.name(), discovered.len());
                return discovered;
            }
        }

        registry.display_names()
    }

    /// One provider attempt with retries; panics become `Unexpected` failures.
    async fn attempt(
        &self,
        provider: &dyn TranslationProvider,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let operation = format!("{} translation ({} -> {})", provider.name(), source, target);
        let call = with_retry_if(
            &self.settings.retry,
            &operation,
            || provider.translate(text, source, target),
            ProviderError::is_retryable,
        );

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ProviderError::Unexpected {
                provider: provider.name(),
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Whether the request can be answered without consulting cache or providers.
    fn is_passthrough(&self, text: &str, source: &str, target: &str) -> bool {
        if !self.settings.enabled {
            debug!("Translation disabled by configuration");
            return true;
        }
        // Providers cannot translate into "detect the language"
        if target.is_empty() || target == AUTO_DETECT {
            return true;
        }
        if target == source || target == Language::canonical().code() {
            return true;
        }
        text.trim().is_empty()
    }
}

#[async_trait]
impl Translate for TranslationGateway {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        let source = normalize_source(source_lang);
        let target = normalize_code(target_lang);

        if self.is_passthrough(text, &source, &target) {
            self.metrics.record_passthrough();
            return text.to_string();
        }

        if let Some(remaining) = self.cooldown.remaining(self.settings.cooldown) {
            warn!(
                "Translation in cooldown ({:?} left after a rate limit); returning original text",
                remaining
            );
            self.metrics.record_cooldown_skip();
            return text.to_string();
        }

        let key = CacheKey::new(&source, &target, text);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for '{}' ({} -> {})", preview(text), source, target);
            self.metrics.record_cache_hit();
            return cached;
        }
        self.metrics.record_cache_miss();

        debug!("Translating '{}' ({} -> {})", preview(text), source, target);

        for provider in &self.providers {
            self.metrics.record_api_call();

            match self.attempt(provider.as_ref(), text, &source, &target).await {
                Ok(translated) => {
                    self.cache.insert(key, translated.clone(), self.settings.cache_ttl);
                    return translated;
                }
                Err(e) => {
                    self.metrics.record_api_failure();
                    if e.is_rate_limit() {
                        self.cooldown.record_hit();
                        self.metrics.record_rate_limit();
                        warn!("{}; entering {:?} cooldown", e, self.settings.cooldown);
                    } else if e.is_unexpected() {
                        error!("Unexpected translation error: {}", e);
                    } else {
                        warn!("Translation attempt failed: {}", e);
                    }
                }
            }
        }

        warn!(
            "All translation providers failed for '{}' ({} -> {}); returning original text",
            preview(text),
            source,
            target
        );
        self.cache.insert(key, text.to_string(), self.settings.negative_ttl);
        text.to_string()
    }

    fn get_supported_languages(&self) -> BTreeMap<String, String> {
        LanguageRegistry::get().display_names()
    }
}

/// Translate several fields of one item concurrently, preserving order.
pub async fn translate_fields<T, S>(
    translator: &T,
    fields: &[S],
    source_lang: &str,
    target_lang: &str,
) -> Vec<String>
where
    T: Translate + ?Sized,
    S: AsRef<str>,
{
    join_all(
        fields
            .iter()
            .map(|field| translator.translate(field.as_ref(), source_lang, target_lang)),
    )
    .await
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "provider panicked".to_string()
    }
}
