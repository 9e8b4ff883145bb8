/*!
 * Client-side browser state.
 *
 * Models the pieces of the browser the page glue reads and writes:
 * - session storage (key/value, lives for the browsing session)
 * - the cookie jar, written with `document.cookie` style strings
 * - the current location
 * - navigation intents (reloads and form submissions) recorded instead of
 *   performed, so callers decide how to act on them
 */

use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Browser state shared between components
pub type SharedBrowser = Arc<Mutex<BrowserSession>>;

/// A stored cookie
#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// `None` for session cookies
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Whether the cookie has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Parse a `name=value; path=/; expires=...; max-age=...` string
    pub fn parse(cookie: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = cookie.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut parsed = Cookie {
            name: name.to_string(),
            value: value.trim().to_string(),
            path: "/".to_string(),
            expires: None,
        };

        for attribute in parts {
            let Some((key, val)) = attribute.split_once('=') else {
                continue;
            };
            let val = val.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "path" => parsed.path = val.to_string(),
                "expires" => parsed.expires = parse_cookie_date(val),
                "max-age" => {
                    if let Ok(seconds) = val.parse::<i64>() {
                        parsed.expires = Some(now + chrono::Duration::seconds(seconds));
                    }
                }
                _ => {}
            }
        }

        Some(parsed)
    }
}

/// Parse cookie dates such as `Thu, 01 Jan 1970 00:00:00 UTC` or `GMT`
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    let trimmed = value
        .trim_end_matches("UTC")
        .trim_end_matches("GMT")
        .trim();
    NaiveDateTime::parse_from_str(trimmed, "%a, %d %b %Y %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Something the page asked the browser to do next
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationIntent {
    /// Reload the current location
    Reload,
    /// Submit a form, navigating to the response
    SubmitForm {
        method: String,
        action: String,
        fields: Vec<(String, String)>,
    },
}

/// Browser session state
#[derive(Debug, Clone)]
pub struct BrowserSession {
    session_storage: HashMap<String, String>,
    cookies: Vec<Cookie>,
    location: Url,
    navigations: Vec<NavigationIntent>,
}

impl BrowserSession {
    /// Create a fresh session at `location`
    pub fn new(location: Url) -> Self {
        Self {
            session_storage: HashMap::new(),
            cookies: Vec::new(),
            location,
            navigations: Vec::new(),
        }
    }

    /// Wrap the session for sharing with components
    pub fn into_shared(self) -> SharedBrowser {
        Arc::new(Mutex::new(self))
    }

    /// Current location
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Move to another location
    pub fn set_location(&mut self, location: Url) {
        self.location = location;
    }

    /// Read a session storage entry
    pub fn session_item(&self, key: &str) -> Option<&str> {
        self.session_storage.get(key).map(String::as_str)
    }

    /// Write a session storage entry
    pub fn set_session_item(&mut self, key: &str, value: &str) {
        self.session_storage.insert(key.to_string(), value.to_string());
    }

    /// Remove a session storage entry
    pub fn remove_session_item(&mut self, key: &str) {
        self.session_storage.remove(key);
    }

    /// Value of a live cookie
    pub fn cookie(&self, name: &str) -> Option<&str> {
        let now = Utc::now();
        self.cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.as_str())
    }

    /// Full cookie record, expired or not
    pub fn cookie_record(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Apply a `document.cookie` style assignment. An expiry in the past
    /// deletes the cookie.
    pub fn set_cookie(&mut self, cookie: &str) {
        let now = Utc::now();
        let Some(parsed) = Cookie::parse(cookie, now) else {
            debug!("Ignoring malformed cookie assignment: {}", cookie);
            return;
        };

        self.cookies
            .retain(|c| !(c.name == parsed.name && c.path == parsed.path));
        if parsed.is_expired(now) {
            debug!("Cookie '{}' expired", parsed.name);
            return;
        }
        self.cookies.push(parsed);
    }

    /// Record a navigation intent
    pub fn navigate(&mut self, intent: NavigationIntent) {
        debug!("Navigation requested: {:?}", intent);
        self.navigations.push(intent);
    }

    /// Navigation intents recorded so far
    pub fn navigations(&self) -> &[NavigationIntent] {
        &self.navigations
    }

    /// Take and clear the recorded navigation intents
    pub fn take_navigations(&mut self) -> Vec<NavigationIntent> {
        std::mem::take(&mut self.navigations)
    }
}
