/*!
 * Tests for the connection monitor
 *
 * All tests run with paused time so delays are exact.
 */

use livestock_client::app_config::MonitorConfig;
use livestock_client::connection::indicator::ACTIVE_CLASS;
use livestock_client::connection::{
    CONNECTED_MESSAGE, ConnectionMonitor, ConnectionState, NetworkSignal, OFFLINE_MESSAGE, VERY_SLOW_MESSAGE,
};
use livestock_client::dom::{DocumentTree, MemoryDocument, Selector, SharedDocument};
use livestock_client::transport::{MockReply, MockTransport};
use std::time::Duration;

fn monitor_with(mock: &MockTransport, signal: &NetworkSignal) -> (ConnectionMonitor<MockTransport>, SharedDocument) {
    let document = MemoryDocument::new().into_shared();
    let monitor = ConnectionMonitor::new(mock.clone(), document.clone(), MonitorConfig::default(), signal.clone());
    (monitor, document)
}

fn indicator_active(document: &SharedDocument) -> bool {
    let doc = document.lock();
    doc.query(&Selector::parse("#connection-status"))
        .is_some_and(|element| doc.has_class(element, ACTIVE_CLASS))
}

#[tokio::test(start_paused = true)]
async fn test_fast_probe_should_auto_hide_after_exact_delay() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok().after_ms(100));
    let (monitor, document) = monitor_with(&mock, &NetworkSignal::default());
    monitor.start();

    // The immediate probe answers at 100ms, so the indicator hides at 3100ms
    tokio::time::sleep(Duration::from_millis(101)).await;
    let status = monitor.status();
    assert_eq!(status.state, Some(ConnectionState::Online));
    assert_eq!(status.message, CONNECTED_MESSAGE);
    assert!(status.latency.is_some_and(|latency| latency >= Duration::from_millis(100)));
    assert!(indicator_active(&document));

    tokio::time::sleep(Duration::from_millis(2_998)).await;
    assert!(monitor.status().visible);
    assert!(indicator_active(&document));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!monitor.status().visible);
    assert!(!indicator_active(&document));
    monitor.stop();
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_probe_should_report_slow_and_stay_visible() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok().after_ms(10_000));
    let (monitor, document) = monitor_with(&mock, &NetworkSignal::default());
    livestock_client::connection::indicator::ensure_status_element(&mut *document.lock(), &MonitorConfig::default());

    assert_eq!(monitor.probe().await, ConnectionState::Slow);
    let status = monitor.status();
    assert_eq!(status.message, VERY_SLOW_MESSAGE);
    assert_eq!(status.latency, None);

    // The abandoned request completing later changes nothing
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(monitor.status(), status);
    assert!(indicator_active(&document));
}

#[tokio::test(start_paused = true)]
async fn test_probe_while_offline_should_not_send_request() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok());
    let signal = NetworkSignal::new(false);
    let (monitor, _) = monitor_with(&mock, &signal);

    assert_eq!(monitor.probe().await, ConnectionState::Offline);
    assert_eq!(monitor.status().message, OFFLINE_MESSAGE);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_going_offline_during_probe_should_win() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok().after_ms(2_000));
    let signal = NetworkSignal::default();
    let (monitor, _) = monitor_with(&mock, &signal);

    let (state, _) = tokio::join!(monitor.probe(), async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        signal.set_online(false);
    });

    assert_eq!(state, ConnectionState::Offline);
    assert_eq!(monitor.status().message, OFFLINE_MESSAGE);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(monitor.status().state, Some(ConnectionState::Offline));
    assert_eq!(monitor.status().message, OFFLINE_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_status_change_should_cancel_pending_auto_hide() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok());
    let (monitor, document) = monitor_with(&mock, &NetworkSignal::default());
    livestock_client::connection::indicator::ensure_status_element(&mut *document.lock(), &MonitorConfig::default());

    assert_eq!(monitor.probe().await, ConnectionState::Online);
    tokio::time::sleep(Duration::from_secs(1)).await;
    monitor.handle_offline();

    tokio::time::sleep(Duration::from_secs(5)).await;
    let status = monitor.status();
    assert_eq!(status.state, Some(ConnectionState::Offline));
    assert!(status.visible);
    assert!(indicator_active(&document));
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_should_keep_one_probe_loop() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok());
    let (monitor, document) = monitor_with(&mock, &NetworkSignal::default());

    monitor.start();
    monitor.start();
    assert!(monitor.is_running());
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(mock.request_count(), 1);
    assert_eq!(document.lock().query_all(&Selector::parse("#connection-status")).len(), 1);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(mock.request_count(), 2);

    monitor.stop();
    monitor.stop();
    assert!(!monitor.is_running());
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval_should_drive_probe_period() {
    let mock = MockTransport::new();
    mock.route("/ping", MockReply::ok());
    let config = MonitorConfig {
        check_interval_ms: 10_000,
        ..MonitorConfig::default()
    };
    let monitor = ConnectionMonitor::new(mock.clone(), MemoryDocument::new().into_shared(), config, NetworkSignal::default());

    monitor.start();
    tokio::time::sleep(Duration::from_millis(35_000)).await;
    assert_eq!(mock.request_count(), 4);
    assert!(mock.requests().iter().all(|r| r.path == "/ping"));
}
