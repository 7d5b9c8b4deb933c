//! Language codes and the validated `Language` type.
//!
//! Providers disagree about code spellings (`en`, `EN`, `en-US`, `pt_BR`), so
//! every code entering the gateway goes through [`normalize_code`] first.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// Source spelling that asks a provider to detect the language itself.
pub const AUTO_DETECT: &str = "auto";

/// Normalize a language code to a lowercase two-letter ISO 639-1 code.
///
/// `en-US` and `pt_BR` become `en` and `pt`. Returns an empty string for blank
/// input and leaves `auto` untouched.
pub fn normalize_code(code: &str) -> String {
    let trimmed = code.trim().to_ascii_lowercase();
    if trimmed == AUTO_DETECT {
        return trimmed;
    }

    let primary = trimmed
        .split(&['-', '_'][..])
        .next()
        .unwrap_or_default();

    primary.chars().take(2).collect()
}

/// Normalize a source language code; blank or `auto` becomes the canonical language.
pub fn normalize_source(code: &str) -> String {
    let normalized = normalize_code(code);
    if normalized.is_empty() || normalized == AUTO_DETECT {
        Language::canonical().code().to_string()
    } else {
        normalized
    }
}

/// A language present in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Language {
    /// Create a Language from a (possibly regional) language code.
    ///
    /// # Example
    /// ```ignore
    /// let spanish = Language::from_code("es-MX")?;
    /// assert_eq!(spanish.code(), "es");
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        let normalized = normalize_code(code);
        match LanguageRegistry::get().get_by_code(&normalized) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language posts are authored in.
    pub fn canonical() -> Language {
        Language {
            code: LanguageRegistry::get().canonical().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full registry entry for this language.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// `Language` built through `from_code` or `canonical`.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}
