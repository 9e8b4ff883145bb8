use anyhow::Result;
use isolang::Language;

use crate::errors::ConfigError;

/// Language utilities for the languages the application ships
///
/// The web application renders pages in a fixed set of Indian languages plus
/// English. Anything else is still accepted as long as it is a valid ISO 639
/// code, and is named through isolang.
/// Languages with server-rendered translations, in menu order
pub const SUPPORTED_LANGUAGES: [(&str, &str); 10] = [
    ("en", "English"),
    ("hi", "Hindi"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("mr", "Marathi"),
    ("bn", "Bengali"),
    ("pa", "Punjabi"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
];

/// Lowercase, trimmed form of a language code
pub fn normalize_language_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Whether the application ships server-side translations for a code
pub fn is_supported(code: &str) -> bool {
    let normalized = normalize_language_code(code);
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == normalized)
}

/// Validate that a code is an ISO 639-1 or ISO 639-3 language code
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized = normalize_language_code(code);

    let valid = match normalized.len() {
        2 => Language::from_639_1(&normalized).is_some(),
        3 => Language::from_639_3(&normalized).is_some(),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidLanguage(code.to_string()).into())
    }
}

/// English display name of a language, falling back to the code itself
pub fn get_language_name(code: &str) -> String {
    let normalized = normalize_language_code(code);

    if let Some((_, name)) = SUPPORTED_LANGUAGES.iter().find(|(c, _)| *c == normalized) {
        return name.to_string();
    }

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };

    language
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}
