/*!
 * Which language the page is currently shown in.
 *
 * A temporary choice lives in session storage and in a session cookie; a
 * permanent choice is stored by the server and shows up as the `language`
 * cookie or the document's `lang` attribute. At most one override is active.
 */

use crate::browser::BrowserSession;
use crate::dom::DocumentTree;

/// Session storage key and cookie name of a temporary language override
pub const TEMP_LANGUAGE_KEY: &str = "temp_language";

/// Cookie holding the server-side language choice
pub const LANGUAGE_COOKIE: &str = "language";

/// Assignment that deletes the temporary language cookie
pub const EXPIRE_TEMP_LANGUAGE_COOKIE: &str = "temp_language=; expires=Thu, 01 Jan 1970 00:00:00 UTC; path=/;";

/// Scope of the active language override
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideScope {
    /// The page language comes from the server
    #[default]
    None,
    /// Temporary override for this browsing session
    Session,
    /// Choice submitted to the server
    Permanent,
}

/// Current language and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    pub current: String,
    pub scope: OverrideScope,
}

impl LanguagePreference {
    /// Resolve the page language, first match wins:
    /// session storage, temporary cookie, language cookie, root `lang`,
    /// root `data-language`, then `default`
    pub fn resolve(browser: &BrowserSession, doc: &dyn DocumentTree, default: &str) -> Self {
        let non_empty = |value: Option<&str>| value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(lang) = non_empty(browser.session_item(TEMP_LANGUAGE_KEY))
            .or_else(|| non_empty(browser.cookie(TEMP_LANGUAGE_KEY)))
        {
            return Self {
                current: lang,
                scope: OverrideScope::Session,
            };
        }

        let root = doc.root();
        let current = non_empty(browser.cookie(LANGUAGE_COOKIE))
            .or_else(|| non_empty(doc.attr(root, "lang")))
            .or_else(|| non_empty(doc.attr(root, "data-language")))
            .unwrap_or_else(|| default.to_string());

        Self {
            current,
            scope: OverrideScope::None,
        }
    }
}
