//! Language registry: Single source of truth for all supported languages.
//!
//! The registry backs the UI language selector and decides which language is
//! canonical (the language posts are authored in). It is built once behind a
//! `OnceLock` and is immutable afterwards.

use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English display name (e.g., "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Español")
    pub native_name: &'static str,

    /// Whether this is the canonical/source language (only one should be true)
    pub is_canonical: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    canonical: usize,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::from_languages(default_languages()))
    }

    fn from_languages(languages: Vec<LanguageConfig>) -> Self {
        // The built-in table marks exactly one canonical entry; fall back to the first
        let canonical = languages
            .iter()
            .position(|lang| lang.is_canonical)
            .unwrap_or(0);
        Self {
            languages,
            canonical,
        }
    }

    /// Get a language configuration by its two-letter code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get the canonical language configuration.
    ///
    /// The canonical language is the language posts are written in; requests
    /// targeting it never need a provider call.
    pub fn canonical(&self) -> &LanguageConfig {
        &self.languages[self.canonical]
    }

    /// Code → English display name, as shown in the language selector.
    pub fn display_names(&self) -> BTreeMap<String, String> {
        self.languages
            .iter()
            .map(|lang| (lang.code.to_string(), lang.name.to_string()))
            .collect()
    }
}

fn lang(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageConfig {
    LanguageConfig {
        code,
        name,
        native_name,
        is_canonical: false,
    }
}

/// Default language configurations.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
        },
        lang("es", "Spanish", "Español"),
        lang("fr", "French", "Français"),
        lang("de", "German", "Deutsch"),
        lang("it", "Italian", "Italiano"),
        lang("pt", "Portuguese", "Português"),
        lang("ru", "Russian", "Русский"),
        lang("ja", "Japanese", "日本語"),
        lang("ko", "Korean", "한국어"),
        lang("zh", "Chinese", "中文"),
        lang("ar", "Arabic", "العربية"),
        lang("hi", "Hindi", "हिन्दी"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_spanish() {
        let config = LanguageRegistry::get()
            .get_by_code("es")
            .expect("Spanish should be registered");

        assert_eq!(config.name, "Spanish");
        assert_eq!(config.native_name, "Español");
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("xx").is_none());
        assert!(LanguageRegistry::get().get_by_code("").is_none());
    }

    #[test]
    fn test_registry_has_twelve_languages() {
        let all = &LanguageRegistry::get().languages;
        assert_eq!(all.len(), 12);
        for code in ["en", "es", "fr", "de", "it", "pt", "ru", "ja", "ko", "zh", "ar", "hi"] {
            assert!(all.iter().any(|lang| lang.code == code), "missing {}", code);
        }
    }

    #[test]
    fn test_exactly_one_canonical() {
        let canonical: Vec<_> = LanguageRegistry::get()
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();
        assert_eq!(canonical.len(), 1);
        assert_eq!(LanguageRegistry::get().canonical().code, "en");
    }

    #[test]
    fn test_display_names() {
        let names = LanguageRegistry::get().display_names();
        assert_eq!(names.get("en").map(String::as_str), Some("English"));
        assert_eq!(names.get("zh").map(String::as_str), Some("Chinese"));
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_from_languages_without_canonical_uses_first() {
        let registry = LanguageRegistry::from_languages(vec![
            lang("fr", "French", "Français"),
            lang("de", "German", "Deutsch"),
        ]);
        assert_eq!(registry.canonical().code, "fr");
    }
}
