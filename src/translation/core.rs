/*!
 * Translation endpoint client.
 *
 * This module contains the `TranslationClient`, responsible for turning one
 * piece of text into another language through the server's translation
 * endpoint. Translation is best effort: callers always get a string back,
 * falling back to the source text when anything goes wrong.
 */

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::cache::TranslationCache;
use crate::app_config::TranslatorConfig;
use crate::errors::TransportError;
use crate::transport::{HttpRequest, Transport};

/// Body of a translation request
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_language: &'a str,
    source_language: &'a str,
}

/// Body of a translation response
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated: String,
}

/// Client for the translation endpoint with an in-memory cache
#[derive(Debug)]
pub struct TranslationClient<T> {
    /// Transport used for requests
    transport: T,

    /// Path of the translation endpoint
    endpoint: String,

    /// Successful translations
    cache: TranslationCache,
}

impl<T: Transport> TranslationClient<T> {
    /// Create a client from translator settings
    pub fn new(transport: T, config: &TranslatorConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            cache: TranslationCache::new(config.cache_enabled, Duration::from_secs(config.cache_ttl_secs)),
        }
    }

    /// The translation cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Translate text, never failing
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `target` - Target language code
    /// * `source` - Source language code
    ///
    /// # Returns
    /// * `String` - The translation, `""` for blank input, or `text` itself when the
    ///   languages match or the request fails
    pub async fn translate(&self, text: &str, target: &str, source: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        if target == source {
            return text.to_string();
        }

        if let Some(cached) = self.cache.get(text, source, target) {
            return cached;
        }

        match self.request_translation(text, target, source).await {
            Ok(translated) => {
                self.cache.store(text, source, target, &translated);
                translated
            }
            Err(TransportError::Status { status_code, message }) => {
                warn!("Translation failed: {} {}", status_code, message);
                text.to_string()
            }
            Err(e) => {
                error!("Translation error: {}", e);
                text.to_string()
            }
        }
    }

    /// Send one translation request and decode the `translated` field
    pub async fn request_translation(&self, text: &str, target: &str, source: &str) -> Result<String, TransportError> {
        let body = serde_json::to_value(TranslateRequest {
            text,
            target_language: target,
            source_language: source,
        })
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        debug!("Translating {} chars {} -> {}", text.chars().count(), source, target);

        let response: TranslateResponse = self
            .transport
            .send(HttpRequest::post_json(self.endpoint.as_str(), body))
            .await?
            .error_for_status()?
            .json()?;

        Ok(response.translated)
    }
}
