/*!
 * Tests for the disease alert page support
 */

use livestock_client::alerts::{
    AlertFilter, AutoRefresh, DOWNLOADING_TEXT, DiseaseAlertsClient, REFRESHING_TEXT, download_prevention_guide,
    filter_alerts, refresh_alerts, run_refresh_cycle, show_toast,
};
use livestock_client::app_config::AlertsConfig;
use livestock_client::browser::NavigationIntent;
use livestock_client::dom::{DocumentTree, MemoryDocument, NodeId, Selector, SharedDocument};
use livestock_client::errors::ApiError;
use livestock_client::predict::FormControl;
use livestock_client::transport::{MockReply, MockTransport};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::common;

fn visible_animals<D: DocumentTree>(doc: &D) -> Vec<String> {
    doc.query_all(&Selector::parse(".alert-item"))
        .into_iter()
        .filter(|&card| doc.attr(card, "style") == Some("display: block"))
        .filter_map(|card| doc.attr(card, "data-animal").map(str::to_string))
        .collect()
}

fn modal_footer() -> (SharedDocument, NodeId) {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    let footer = doc.element(body, "div", &[("class", "modal-footer")]);
    (doc.into_shared(), footer)
}

fn refreshing_mock() -> MockTransport {
    let mock = MockTransport::new();
    mock.route("/api/disease-alerts/refresh", MockReply::json(json!({"success": true, "message": "Refreshed"})))
        .route("/api/disease-alerts/risks", MockReply::json(json!({"risks": []})))
        .route("/api/disease-alerts/nearby", MockReply::json(json!({"outbreaks": []})));
    mock
}

#[test]
fn test_filter_alerts_should_match_attribute_exactly() {
    let mut doc = common::alert_cards(&[
        ("Anand", "cattle", "high"),
        ("Pune", "poultry", "low"),
        ("Anand", "goat", "medium"),
    ]);

    assert_eq!(filter_alerts(&mut doc, AlertFilter::Location, "Anand"), 2);
    assert_eq!(visible_animals(&doc), vec!["cattle", "goat"]);

    assert_eq!(filter_alerts(&mut doc, AlertFilter::Risk, "low"), 1);
    assert_eq!(visible_animals(&doc), vec!["poultry"]);

    assert_eq!(filter_alerts(&mut doc, AlertFilter::Animal, "sheep"), 0);
    assert!(visible_animals(&doc).is_empty());

    assert_eq!(filter_alerts(&mut doc, AlertFilter::Animal, "all"), 3);
}

#[tokio::test]
async fn test_client_should_surface_error_statuses() {
    let mock = MockTransport::new();
    mock.route("/api/disease-alerts/outbreak/42", MockReply::status(404, "missing"));
    let client = DiseaseAlertsClient::new(mock);

    let err = client.outbreak("42").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_prevention_guide_should_return_server_message() {
    let mock = MockTransport::new();
    mock.route(
        "/api/disease-alerts/prevention-guide",
        MockReply::json(json!({"success": true, "message": "Guide sent to your email"})),
    );
    let client = DiseaseAlertsClient::new(mock);

    assert_eq!(client.prevention_guide("Anthrax").await.unwrap(), "Guide sent to your email");
}

#[test]
fn test_show_toast_without_body_should_do_nothing() {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    doc.detach(body);

    assert!(show_toast(&mut doc, "Auto Update", "updated", "info").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_refresh_cycle_with_rejected_refresh_should_not_reload() {
    let mock = MockTransport::new();
    mock.route("/api/disease-alerts/refresh", MockReply::json(json!({"success": false})));
    let client = DiseaseAlertsClient::new(mock.clone());
    let document = common::alert_cards(&[]).into_shared();
    let browser = common::browser();

    assert!(!run_refresh_cycle(&client, &document, &browser, Duration::from_secs(3)).await);
    assert!(browser.lock().navigations().is_empty());
    assert!(document.lock().query(&Selector::parse(".toast")).is_none());
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_cycle_with_failed_update_check_should_not_reload() {
    let mock = refreshing_mock();
    mock.route("/api/disease-alerts/nearby", MockReply::status(500, "boom"));
    let client = DiseaseAlertsClient::new(mock.clone());
    let document = common::alert_cards(&[]).into_shared();
    let browser = common::browser();

    assert!(!run_refresh_cycle(&client, &document, &browser, Duration::from_secs(3)).await);
    assert!(browser.lock().navigations().is_empty());
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_should_toast_then_reload() {
    let mock = refreshing_mock();
    let client = Arc::new(DiseaseAlertsClient::new(mock.clone()));
    let document = common::alert_cards(&[("Anand", "cattle", "high")]).into_shared();
    let browser = common::browser();

    let mut refresh = AutoRefresh::start(client, document.clone(), browser.clone(), &AlertsConfig::default());
    assert!(refresh.is_running());

    tokio::time::sleep(Duration::from_secs(29 * 60)).await;
    assert_eq!(mock.request_count(), 0);

    tokio::time::sleep(Duration::from_secs(60) + Duration::from_millis(1)).await;
    assert_eq!(mock.requests_to("/api/disease-alerts/refresh").len(), 1);
    {
        let doc = document.lock();
        let toast = doc.query(&Selector::parse(".toast-body")).unwrap();
        assert_eq!(doc.text_content(toast), "Disease risk data updated with latest weather conditions");
    }
    assert!(browser.lock().navigations().is_empty());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(browser.lock().navigations(), &[NavigationIntent::Reload]);

    refresh.stop();
    assert!(!refresh.is_running());
    tokio::time::sleep(Duration::from_secs(2 * 60 * 60)).await;
    assert_eq!(mock.requests_to("/api/disease-alerts/refresh").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_alerts_should_toast_success_then_reload() {
    let mock = refreshing_mock();
    let client = DiseaseAlertsClient::new(mock.clone());
    let document = common::alert_cards(&[("Anand", "cattle", "high")]).into_shared();
    let browser = common::browser();
    let mut control = FormControl::new("Refresh Data");

    let start = tokio::time::Instant::now();
    assert!(refresh_alerts(&client, &document, &browser, &mut control, Duration::from_millis(1_500)).await);

    assert!(start.elapsed() >= Duration::from_millis(1_500));
    assert_eq!(browser.lock().navigations(), &[NavigationIntent::Reload]);
    assert!(control.is_disabled());
    assert!(control.label().ends_with(REFRESHING_TEXT));
    assert_eq!(mock.request_count(), 1);

    let doc = document.lock();
    let toast = doc.query(&Selector::parse(".toast")).unwrap();
    assert!(doc.to_html(toast).contains("toast-header bg-success text-white"));
    let body = doc.query(&Selector::parse(".toast-body")).unwrap();
    assert_eq!(doc.text_content(body), "Disease alerts refreshed with real-time data");
}

#[tokio::test(start_paused = true)]
async fn test_refresh_alerts_rejection_should_toast_error_and_restore_control() {
    let mock = MockTransport::new();
    mock.route(
        "/api/disease-alerts/refresh",
        MockReply::json(json!({"success": false, "message": "Weather service down"})),
    );
    let client = DiseaseAlertsClient::new(mock);
    let document = common::alert_cards(&[]).into_shared();
    let browser = common::browser();
    let mut control = FormControl::new("Refresh Data");

    assert!(!refresh_alerts(&client, &document, &browser, &mut control, Duration::from_millis(1_500)).await);

    assert!(browser.lock().navigations().is_empty());
    assert_eq!(control.label(), "Refresh Data");
    assert!(!control.is_disabled());

    let doc = document.lock();
    let toast = doc.query(&Selector::parse(".toast")).unwrap();
    assert!(doc.to_html(toast).contains("toast-header bg-danger text-white"));
    let body = doc.query(&Selector::parse(".toast-body")).unwrap();
    assert_eq!(doc.text_content(body), "Failed to refresh alert data: Weather service down");
}

#[tokio::test(start_paused = true)]
async fn test_prevention_guide_download_should_show_notice_for_five_seconds() {
    let mock = MockTransport::new();
    mock.route(
        "/api/disease-alerts/prevention-guide",
        MockReply::json(json!({"success": true, "message": "Guide sent to your email"})).after_ms(200),
    );
    let client = DiseaseAlertsClient::new(mock.clone());
    let (document, footer) = modal_footer();
    let mut control = FormControl::new("Download Guide");

    let notice = download_prevention_guide(&client, &document, footer, "Lumpy Skin", &mut control, Duration::from_secs(5)).await;

    assert!(notice.success);
    assert!(notice.is_pending());
    assert_eq!(control.label(), "Download Guide");
    assert!(!control.is_disabled());
    assert_eq!(mock.requests()[0].path, "/api/disease-alerts/prevention-guide?disease=Lumpy+Skin");
    {
        let doc = document.lock();
        assert_eq!(doc.attr(notice.node, "class"), Some("alert alert-success mt-2 w-100"));
        assert!(doc.query_within(notice.node, &Selector::parse(".fa-check-circle")).is_some());
        assert_eq!(doc.text_content(footer), " Guide sent to your email");
    }

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert!(document.lock().is_attached(notice.node));

    tokio::time::sleep(Duration::from_millis(101)).await;
    assert!(!document.lock().is_attached(notice.node));
    assert!(!notice.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_failed_prevention_guide_download_should_show_error_and_restore_control() {
    let mock = MockTransport::new();
    mock.route("/api/disease-alerts/prevention-guide", MockReply::status(500, "boom"));
    let client = DiseaseAlertsClient::new(mock);
    let (document, footer) = modal_footer();
    let mut control = FormControl::new("Download Guide");

    let mut notice = download_prevention_guide(&client, &document, footer, "Anthrax", &mut control, Duration::from_secs(5)).await;
    notice.cancel_removal();

    assert!(!notice.success);
    assert!(!control.label().contains(DOWNLOADING_TEXT));
    assert!(!control.is_disabled());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let doc = document.lock();
    assert!(doc.is_attached(notice.node));
    assert_eq!(doc.attr(notice.node, "class"), Some("alert alert-danger mt-2 w-100"));
    assert!(doc.query_within(notice.node, &Selector::parse(".fa-exclamation-circle")).is_some());
    assert!(doc.text_content(notice.node).starts_with(" Error: "));
}
