/*!
 * Tests for the translation client and its cache
 */

use livestock_client::app_config::TranslatorConfig;
use livestock_client::translation::{TranslationCache, TranslationClient};
use livestock_client::transport::{MockReply, MockTransport};
use serde_json::json;
use std::time::Duration;

fn client_with(mock: &MockTransport, config: TranslatorConfig) -> TranslationClient<MockTransport> {
    TranslationClient::new(mock.clone(), &config)
}

#[tokio::test]
async fn test_translate_with_blank_text_should_return_empty_without_request() {
    let mock = MockTransport::translating();
    let client = client_with(&mock, TranslatorConfig::default());

    assert_eq!(client.translate("", "hi", "en").await, "");
    assert_eq!(client.translate("   \n\t", "hi", "en").await, "");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translate_with_same_languages_should_return_text_without_request() {
    let mock = MockTransport::translating();
    let client = client_with(&mock, TranslatorConfig::default());

    assert_eq!(client.translate("Vaccination schedule", "en", "en").await, "Vaccination schedule");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translate_twice_should_hit_cache() {
    let mock = MockTransport::translating();
    let client = client_with(&mock, TranslatorConfig::default());

    let first = client.translate("Breed detection", "ta", "en").await;
    let second = client.translate("Breed detection", "ta", "en").await;

    assert_eq!(first, "[ta] Breed detection");
    assert_eq!(second, first);
    assert_eq!(mock.requests_to("/api/translate").len(), 1);
    let stats = client.cache().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_translate_with_cache_disabled_should_always_request() {
    let mock = MockTransport::translating();
    let config = TranslatorConfig {
        cache_enabled: false,
        ..TranslatorConfig::default()
    };
    let client = client_with(&mock, config);

    client.translate("Feed", "te", "en").await;
    client.translate("Feed", "te", "en").await;

    assert_eq!(mock.request_count(), 2);
    assert!(client.cache().is_empty());
}

#[tokio::test]
async fn test_translate_with_server_error_should_return_original_and_not_cache() {
    let mock = MockTransport::translating();
    mock.enqueue("/api/translate", MockReply::status(500, "model unavailable"));
    let client = client_with(&mock, TranslatorConfig::default());

    assert_eq!(client.translate("Milk yield", "mr", "en").await, "Milk yield");
    assert!(client.cache().is_empty());

    assert_eq!(client.translate("Milk yield", "mr", "en").await, "[mr] Milk yield");
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_translate_with_connection_error_should_return_original() {
    let mock = MockTransport::new();
    mock.route("/api/translate", MockReply::connection_error());
    let client = client_with(&mock, TranslatorConfig::default());

    assert_eq!(client.translate("Alerts", "bn", "en").await, "Alerts");
}

#[tokio::test]
async fn test_request_translation_with_unexpected_body_should_fail() {
    let mock = MockTransport::new();
    mock.route("/api/translate", MockReply::json(json!({"result": "x"})));
    let client = client_with(&mock, TranslatorConfig::default());

    assert!(client.request_translation("Alerts", "bn", "en").await.is_err());
}

#[tokio::test]
async fn test_request_translation_should_use_configured_endpoint() {
    let mock = MockTransport::new();
    mock.route("/translate/v2", MockReply::json(json!({"translated": "ok"})));
    let config = TranslatorConfig {
        endpoint: "/translate/v2".to_string(),
        ..TranslatorConfig::default()
    };
    let client = client_with(&mock, config);

    assert_eq!(client.request_translation("Alerts", "pa", "en").await.unwrap(), "ok");
    let body = mock.requests()[0].json_body().cloned().unwrap();
    assert_eq!(body, json!({"text": "Alerts", "target_language": "pa", "source_language": "en"}));
}

#[tokio::test(start_paused = true)]
async fn test_cache_entry_should_expire_after_ttl() {
    let cache = TranslationCache::new(true, Duration::from_secs(60));
    cache.store("Cow", "en", "hi", "gaay");
    assert_eq!(cache.get("Cow", "en", "hi"), Some("gaay".to_string()));

    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(cache.get("Cow", "en", "hi"), None);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_should_key_on_both_languages() {
    let cache = TranslationCache::new(true, Duration::from_secs(60));
    cache.store("Goat", "en", "hi", "bakri");

    assert_eq!(cache.get("Goat", "en", "ta"), None);
    assert_eq!(cache.get("Goat", "te", "hi"), None);
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}
