use anyhow::{bail, Context, Result};

pub const DEFAULT_PRIMARY_URL: &str = "https://libretranslate.de/translate";
pub const DEFAULT_FALLBACK_URL: &str = "https://api.mymemory.translated.net/get";

#[derive(Debug, Clone)]
pub struct Config {
    // Environment ("development" or "production")
    pub environment: String,

    // Translation
    pub translation_enabled: bool,
    pub translation_api_url: String,
    pub translation_api_key: Option<String>,
    pub translation_fallback_url: String,
    pub translation_timeout_secs: u64,

    // Server
    pub debug_key: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            translation_enabled: true,

            // An explicitly empty URL disables the primary provider
            translation_api_url: std::env::var("TRANSLATION_API_URL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_PRIMARY_URL.to_string()),
            translation_api_key: std::env::var("TRANSLATION_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            translation_fallback_url: std::env::var("TRANSLATION_FALLBACK_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_string()),
            translation_timeout_secs: 5,

            debug_key: std::env::var("DEBUG_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            port: 8080,
        };

        // Production keeps translation off unless explicitly enabled
        config.translation_enabled = match std::env::var("TRANSLATION_ENABLED") {
            Ok(v) => parse_bool(&v)
                .with_context(|| format!("TRANSLATION_ENABLED is not a boolean: {}", v))?,
            Err(_) => !config.is_production(),
        };

        if let Ok(v) = std::env::var("TRANSLATION_TIMEOUT_SECS") {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("TRANSLATION_TIMEOUT_SECS is not a number: {}", v))?;
            if secs == 0 {
                bail!("TRANSLATION_TIMEOUT_SECS must be at least 1");
            }
            config.translation_timeout_secs = secs;
        }

        if let Ok(v) = std::env::var("PORT") {
            config.port = v
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", v))?;
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            translation_enabled: true,
            translation_api_url: DEFAULT_PRIMARY_URL.to_string(),
            translation_api_key: None,
            translation_fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            translation_timeout_secs: 5,
            debug_key: None,
            port: 8080,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
