//! Language metadata for the translation gateway.
//!
//! - `registry`: the fixed table of supported languages and the canonical one
//! - `language`: code normalization and the validated `Language` type

mod language;
mod registry;

pub use language::{normalize_code, normalize_source, Language, AUTO_DETECT};
pub use registry::{LanguageConfig, LanguageRegistry};
