/*!
 * Disease alert page support.
 *
 * - `DiseaseAlertsClient`: typed access to the disease alert API
 * - `filter_alerts`: show or hide alert cards by location, animal or risk
 * - `show_toast`: append a notification toast to the page
 * - `refresh_alerts`: the refresh button, announced with a toast
 * - `download_prevention_guide`: the modal's guide button, answered with a
 *   short-lived notice in the modal footer
 * - `AutoRefresh`: periodic silent refresh followed by a page reload
 */

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::form_urlencoded;
use uuid::Uuid;

use crate::app_config::AlertsConfig;
use crate::browser::{NavigationIntent, SharedBrowser};
use crate::dom::{DocumentTree, NodeId, Selector, SharedDocument};
use crate::errors::ApiError;
use crate::predict::FormControl;
use crate::render::alerts::{DiseaseInfo, OutbreakDetails};
use crate::tasks::ScheduledTask;
use crate::transport::{Transport, get_json};

/// Acknowledgement returned by action endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiAck {
    /// The message of a successful ack, or the rejection as an error
    pub fn into_result(self) -> Result<Option<String>, ApiError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Client for `/api/disease-alerts/*`
#[derive(Debug, Clone)]
pub struct DiseaseAlertsClient<T> {
    transport: T,
}

impl<T: Transport> DiseaseAlertsClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Description, symptoms and risk factors of a disease
    pub async fn info(&self, disease: &str) -> Result<DiseaseInfo, ApiError> {
        let path = format!("/api/disease-alerts/info?disease={}", encode(disease));
        Ok(get_json(&self.transport, &path).await?)
    }

    /// Details of one reported outbreak
    pub async fn outbreak(&self, id: &str) -> Result<OutbreakDetails, ApiError> {
        let path = format!("/api/disease-alerts/outbreak/{}", encode(id));
        Ok(get_json(&self.transport, &path).await?)
    }

    /// Request the prevention guide of a disease; returns the server message
    pub async fn prevention_guide(&self, disease: &str) -> Result<String, ApiError> {
        let path = format!("/api/disease-alerts/prevention-guide?disease={}", encode(disease));
        let ack: ApiAck = get_json(&self.transport, &path).await?;
        Ok(ack.into_result()?.unwrap_or_default())
    }

    /// Ask the server to refresh its alert data
    pub async fn refresh(&self) -> Result<ApiAck, ApiError> {
        let ack: ApiAck = get_json(&self.transport, "/api/disease-alerts/refresh").await?;
        ack.clone().into_result()?;
        Ok(ack)
    }

    /// Current weather-driven disease risks
    pub async fn risks(&self) -> Result<Value, ApiError> {
        Ok(get_json(&self.transport, "/api/disease-alerts/risks").await?)
    }

    /// Outbreaks near the farm
    pub async fn nearby(&self) -> Result<Value, ApiError> {
        Ok(get_json(&self.transport, "/api/disease-alerts/nearby").await?)
    }
}

/// Alert card attribute a filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertFilter {
    Location,
    Animal,
    Risk,
}

impl AlertFilter {
    fn attribute(&self) -> &'static str {
        match self {
            Self::Location => "data-location",
            Self::Animal => "data-animal",
            Self::Risk => "data-risk",
        }
    }
}

/// Show the `.alert-item` cards matching `value` and hide the others;
/// `all` shows everything. Returns how many cards are visible.
pub fn filter_alerts<D: DocumentTree + ?Sized>(doc: &mut D, filter: AlertFilter, value: &str) -> usize {
    let mut visible = 0;
    for item in doc.query_all(&Selector::parse(".alert-item")) {
        let show = value == "all" || doc.attr(item, filter.attribute()) == Some(value);
        doc.set_attr(item, "style", if show { "display: block" } else { "display: none" });
        if show {
            visible += 1;
        }
    }
    debug!("Alert filter {:?}={} leaves {} visible", filter, value, visible);
    visible
}

/// Append a toast to the page's toast container, creating the container when
/// needed. `kind` is a Bootstrap contextual colour such as `info` or `danger`.
pub fn show_toast<D: DocumentTree + ?Sized>(doc: &mut D, title: &str, message: &str, kind: &str) -> Option<NodeId> {
    let body = doc.body()?;
    let container = match doc.query(&Selector::parse(".toast-container")) {
        Some(container) => container,
        None => {
            let container = doc.create_element("div");
            doc.set_attr(container, "class", "toast-container position-fixed top-0 end-0 p-3");
            doc.append_child(body, container);
            container
        }
    };

    let toast = doc.create_element("div");
    doc.set_attr(toast, "id", &format!("toast-{}", Uuid::new_v4()));
    doc.set_attr(toast, "class", "toast");
    doc.set_attr(toast, "role", "alert");
    doc.set_attr(toast, "aria-live", "assertive");
    doc.set_attr(toast, "aria-atomic", "true");

    let header = doc.create_element("div");
    doc.set_attr(header, "class", &format!("toast-header bg-{} text-white", kind));
    let heading = doc.create_element("strong");
    doc.set_attr(heading, "class", "me-auto");
    doc.set_text_content(heading, title);
    let age = doc.create_element("small");
    doc.set_text_content(age, "just now");
    let close = doc.create_element("button");
    doc.set_attr(close, "type", "button");
    doc.set_attr(close, "class", "btn-close btn-close-white");
    doc.set_attr(close, "data-bs-dismiss", "toast");
    doc.set_attr(close, "aria-label", "Close");
    doc.append_child(header, heading);
    doc.append_child(header, age);
    doc.append_child(header, close);

    let toast_body = doc.create_element("div");
    doc.set_attr(toast_body, "class", "toast-body");
    doc.set_text_content(toast_body, message);

    doc.append_child(toast, header);
    doc.append_child(toast, toast_body);
    doc.append_child(container, toast);
    Some(toast)
}

/// Busy text of the refresh button
pub const REFRESHING_TEXT: &str = "Refreshing...";

/// Busy text of the prevention guide button
pub const DOWNLOADING_TEXT: &str = "Downloading...";

/// Refresh requested from the page's refresh button.
///
/// On success a "Success" toast is shown and a reload is requested after
/// `reload_delay`; the button stays busy until the page goes away. On failure a
/// danger toast carries the error and the button is restored.
///
/// # Returns
/// * `bool` - Whether a reload was requested
pub async fn refresh_alerts<T, D>(
    client: &DiseaseAlertsClient<T>,
    document: &SharedDocument<D>,
    browser: &SharedBrowser,
    control: &mut FormControl,
    reload_delay: Duration,
) -> bool
where
    T: Transport,
    D: DocumentTree,
{
    control.begin_with(REFRESHING_TEXT);

    if let Err(e) = client.refresh().await {
        error!("Manual refresh failed: {}", e);
        show_toast(
            &mut *document.lock(),
            "Error",
            &format!("Failed to refresh alert data: {}", e),
            "danger",
        );
        control.restore();
        return false;
    }

    show_toast(
        &mut *document.lock(),
        "Success",
        "Disease alerts refreshed with real-time data",
        "success",
    );
    tokio::time::sleep(reload_delay).await;
    browser.lock().navigate(NavigationIntent::Reload);
    true
}

/// Success or error notice appended to a modal footer
#[derive(Debug)]
pub struct FooterNotice {
    pub node: NodeId,
    pub success: bool,
    removal: ScheduledTask,
}

impl FooterNotice {
    /// Whether the notice is still waiting to be removed
    pub fn is_pending(&self) -> bool {
        self.removal.is_active()
    }

    /// Keep the notice on the page
    pub fn cancel_removal(&mut self) {
        self.removal.cancel();
    }
}

/// Request the prevention guide for `disease` and report the outcome in
/// `footer`. The notice is removed after `notice_lifetime` unless the returned
/// handle is dropped first. The control is restored on every path.
pub async fn download_prevention_guide<T, D>(
    client: &DiseaseAlertsClient<T>,
    document: &SharedDocument<D>,
    footer: NodeId,
    disease: &str,
    control: &mut FormControl,
    notice_lifetime: Duration,
) -> FooterNotice
where
    T: Transport,
    D: DocumentTree + Send + 'static,
{
    control.begin_with(DOWNLOADING_TEXT);
    let outcome = client.prevention_guide(disease).await;
    control.restore();

    let (success, text) = match outcome {
        Ok(message) => {
            info!("Prevention guide for {} requested", disease);
            (true, format!(" {}", message))
        }
        Err(e) => {
            error!("Prevention guide download failed: {}", e);
            (false, format!(" Error: {}", e))
        }
    };
    let (kind, icon_class) = if success {
        ("success", "fas fa-check-circle me-2")
    } else {
        ("danger", "fas fa-exclamation-circle me-2")
    };

    let node = {
        let mut doc = document.lock();
        let notice = doc.create_element("div");
        doc.set_attr(notice, "class", &format!("alert alert-{} mt-2 w-100", kind));
        let icon = doc.create_element("i");
        doc.set_attr(icon, "class", icon_class);
        let message = doc.create_text(&text);
        doc.append_child(notice, icon);
        doc.append_child(notice, message);
        doc.append_child(footer, notice);
        notice
    };

    let document = Arc::clone(document);
    let removal = ScheduledTask::after("prevention-guide-notice", notice_lifetime, move || async move {
        document.lock().detach(node);
    });

    FooterNotice { node, success, removal }
}

/// One silent refresh: refresh, fetch risks and nearby outbreaks, then
/// announce the update and ask for a reload after `reload_delay`.
/// Returns whether a reload was requested.
pub async fn run_refresh_cycle<T, D>(
    client: &DiseaseAlertsClient<T>,
    document: &SharedDocument<D>,
    browser: &SharedBrowser,
    reload_delay: Duration,
) -> bool
where
    T: Transport,
    D: DocumentTree,
{
    if let Err(e) = client.refresh().await {
        error!("Auto-refresh error: {}", e);
        return false;
    }

    let (risks, nearby) = tokio::join!(client.risks(), client.nearby());
    if let Err(e) = risks.and(nearby) {
        error!("Error checking for updates: {}", e);
        return false;
    }

    show_toast(
        &mut *document.lock(),
        "Auto Update",
        "Disease risk data updated with latest weather conditions",
        "info",
    );

    tokio::time::sleep(reload_delay).await;
    browser.lock().navigate(NavigationIntent::Reload);
    true
}

/// Periodic refresh of the disease alert page
#[derive(Debug)]
pub struct AutoRefresh {
    task: Option<ScheduledTask>,
}

impl AutoRefresh {
    /// Start refreshing every configured interval
    pub fn start<T, D>(
        client: Arc<DiseaseAlertsClient<T>>,
        document: SharedDocument<D>,
        browser: SharedBrowser,
        config: &AlertsConfig,
    ) -> Self
    where
        T: Transport + 'static,
        D: DocumentTree + Send + 'static,
    {
        let interval = Duration::from_secs(config.refresh_interval_secs);
        let reload_delay = Duration::from_millis(config.reload_delay_ms);

        let task = ScheduledTask::every("alerts-auto-refresh", interval, move || {
            let client = Arc::clone(&client);
            let document = Arc::clone(&document);
            let browser = Arc::clone(&browser);
            async move {
                run_refresh_cycle(&client, &document, &browser, reload_delay).await;
            }
        });

        info!("Auto-refresh timer set for disease alerts - every {} minutes", interval.as_secs() / 60);
        Self { task: Some(task) }
    }

    /// Whether the timer is still scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(ScheduledTask::is_active)
    }

    /// Cancel the timer and any refresh in progress
    pub fn stop(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}
