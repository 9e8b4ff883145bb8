/*!
 * Client-side page translation.
 *
 * This module contains everything the page needs to show itself in another
 * language. It is split into several submodules:
 *
 * - `core`: translation endpoint client with best-effort fallback
 * - `cache`: in-memory cache of successful translations
 * - `preference`: resolution of the current language and its override scope
 * - `page`: the page translator driving whole-page passes
 */

// Re-export main types for easier usage
pub use self::cache::{CacheStats, TranslationCache};
pub use self::core::TranslationClient;
pub use self::page::PageTranslator;
pub use self::preference::{LanguagePreference, OverrideScope};

// Submodules
pub mod cache;
pub mod core;
pub mod page;
pub mod preference;
