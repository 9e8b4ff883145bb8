/*!
 * Integration tests for switching the page language
 */

use livestock_client::app_config::TranslatorConfig;
use livestock_client::browser::NavigationIntent;
use livestock_client::dom::{DocumentTree, Selector};
use livestock_client::translation::preference::TEMP_LANGUAGE_KEY;
use livestock_client::translation::{OverrideScope, PageTranslator};
use livestock_client::transport::MockTransport;

use crate::common;

#[tokio::test(start_paused = true)]
async fn test_permanent_change_should_clear_override_and_submit_form() {
    common::init_test_logging();
    let (document, page) = common::shared_sample_page();
    let browser = common::browser();
    {
        let mut browser = browser.lock();
        browser.set_session_item(TEMP_LANGUAGE_KEY, "hi");
        browser.set_cookie("temp_language=hi; path=/");
    }
    let mock = MockTransport::translating();
    let translator = PageTranslator::new(mock.clone(), document.clone(), browser.clone(), TranslatorConfig::default());
    assert_eq!(translator.current_language(), "hi");

    translator.change_language("ta", true).await;

    let browser = browser.lock();
    assert!(browser.session_item(TEMP_LANGUAGE_KEY).is_none());
    assert!(browser.cookie(TEMP_LANGUAGE_KEY).is_none());
    assert_eq!(
        browser.navigations(),
        &[NavigationIntent::SubmitForm {
            method: "POST".to_string(),
            action: "/language/set".to_string(),
            fields: vec![
                ("language".to_string(), "ta".to_string()),
                ("next".to_string(), "http://localhost:5000/dashboard".to_string()),
            ],
        }]
    );
    assert_eq!(translator.preference().scope, OverrideScope::Permanent);

    assert_eq!(mock.request_count(), 0);
    let doc = document.lock();
    assert_eq!(doc.text_content(page.paragraph), "Monitor the health of your herd");
    assert!(doc.query(&Selector::parse(".bg-success")).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_repeated_temporary_change_should_not_translate_again() {
    let (document, _) = common::shared_sample_page();
    let mock = MockTransport::translating();
    let translator = PageTranslator::new(mock.clone(), document, common::browser(), TranslatorConfig::default());

    translator.change_language("hi", false).await;
    let requests = mock.request_count();
    assert!(requests > 0);

    translator.change_language("hi", false).await;
    assert_eq!(mock.request_count(), requests);
}

#[tokio::test(start_paused = true)]
async fn test_second_temporary_change_should_translate_from_previous_language() {
    let (document, page) = common::shared_sample_page();
    let mock = MockTransport::translating();
    let translator = PageTranslator::new(mock.clone(), document.clone(), common::browser(), TranslatorConfig::default());

    translator.change_language("hi", false).await;
    mock.clear_requests();
    translator.change_language("ta", false).await;

    let requests = mock.requests_to("/api/translate");
    assert!(!requests.is_empty());
    for request in &requests {
        let body = request.json_body().unwrap();
        assert_eq!(body["source_language"], "hi");
        assert_eq!(body["target_language"], "ta");
    }
    assert_eq!(document.lock().text_content(page.heading), "[ta] [hi] Welcome");
}

#[tokio::test(start_paused = true)]
async fn test_temporary_choice_should_survive_reload() {
    let browser = common::browser();
    {
        let (document, _) = common::shared_sample_page();
        let translator = PageTranslator::new(MockTransport::translating(), document, browser.clone(), TranslatorConfig::default());
        translator.change_language("mr", false).await;
        translator.dispose();
    }

    let (document, page) = common::shared_sample_page();
    let translator = PageTranslator::new(MockTransport::translating(), document.clone(), browser, TranslatorConfig::default());
    assert_eq!(translator.current_language(), "mr");
    assert_eq!(translator.preference().scope, OverrideScope::Session);

    translator.initialize_page().await;
    let doc = document.lock();
    assert_eq!(doc.text_content(page.heading), "[mr] Welcome");
    assert!(doc.text_content(page.dropdown_toggle).ends_with(" Marathi"));
}

#[tokio::test(start_paused = true)]
async fn test_reset_temporary_language_should_expire_override_and_reload() {
    let (document, _) = common::shared_sample_page();
    let browser = common::browser();
    let translator = PageTranslator::new(MockTransport::translating(), document, browser.clone(), TranslatorConfig::default());
    translator.change_language("gu", false).await;
    assert_eq!(browser.lock().cookie(TEMP_LANGUAGE_KEY), Some("gu"));

    translator.reset_temporary_language();

    let browser = browser.lock();
    assert!(browser.session_item(TEMP_LANGUAGE_KEY).is_none());
    assert!(browser.cookie(TEMP_LANGUAGE_KEY).is_none());
    assert!(browser.cookie_record(TEMP_LANGUAGE_KEY).is_none());
    assert_eq!(browser.navigations().last(), Some(&NavigationIntent::Reload));
    assert_eq!(translator.preference().scope, OverrideScope::None);
}
