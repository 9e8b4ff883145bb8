/*!
 * Connection quality monitoring.
 *
 * The `ConnectionMonitor` probes a liveness endpoint on an interval and shows
 * the result in a status element:
 * - fast successful probe: online, auto-hidden after a short delay
 * - slow or timed out probe: slow, stays visible
 * - error status, network failure or platform offline: offline, stays visible
 *
 * The platform offline signal always wins. A probe racing the signal is
 * abandoned as soon as the platform reports offline.
 *
 * - `indicator`: creation and updates of the status element
 * - `signal`: the platform online/offline signal
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::app_config::MonitorConfig;
use crate::dom::{DocumentTree, MemoryDocument, SharedDocument};
use crate::errors::TransportError;
use crate::tasks::ScheduledTask;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub mod indicator;
pub mod signal;

pub use self::signal::NetworkSignal;

pub const CONNECTED_MESSAGE: &str = "Connected";
pub const OFFLINE_MESSAGE: &str = "You are offline. Please check your internet connection.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const VERY_SLOW_MESSAGE: &str = "Very slow connection detected. Some features may not work properly.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error. Please check your internet connection.";

/// Message for a successful probe above the slow threshold
pub fn slow_message(latency_ms: u128) -> String {
    format!("Slow connection detected ({}ms). This may affect app performance.", latency_ms)
}

/// Connection quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Online,
    Slow,
    Offline,
}

/// Point-in-time view of the monitor
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// `None` until the first status update
    pub state: Option<ConnectionState>,
    pub message: String,
    /// Round trip of the last successful probe
    pub latency: Option<Duration>,
    /// Whether the status element is shown
    pub visible: bool,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            state: None,
            message: indicator::CHECKING_MESSAGE.to_string(),
            latency: None,
            visible: false,
        }
    }
}

struct Inner<T, D> {
    transport: T,
    document: SharedDocument<D>,
    config: MonitorConfig,
    signal: NetworkSignal,
    status: Mutex<StatusSnapshot>,
    auto_hide: Mutex<Option<ScheduledTask>>,
}

impl<T, D> Inner<T, D>
where
    T: Transport + 'static,
    D: DocumentTree + Send + 'static,
{
    fn state_class(&self, state: ConnectionState) -> &str {
        match state {
            ConnectionState::Online => &self.config.online_class,
            ConnectionState::Slow => &self.config.slow_class,
            ConnectionState::Offline => &self.config.offline_class,
        }
    }

    /// Show a status; any pending auto-hide is cancelled first
    fn update_status(self: &Arc<Self>, state: ConnectionState, message: &str, auto_hide: bool) {
        if let Some(mut pending) = self.auto_hide.lock().take() {
            pending.cancel();
        }

        let shown = indicator::show_status(&mut *self.document.lock(), &self.config, self.state_class(state), message);

        {
            let mut status = self.status.lock();
            status.state = Some(state);
            status.message = message.to_string();
            status.visible = shown;
        }

        if auto_hide && shown {
            let inner = Arc::clone(self);
            let task = ScheduledTask::after("connection-auto-hide", self.config.auto_hide(), move || async move {
                indicator::hide_status(&mut *inner.document.lock(), &inner.config);
                inner.status.lock().visible = false;
            });
            *self.auto_hide.lock() = Some(task);
        }
    }

    fn handle_offline(self: &Arc<Self>) {
        self.update_status(ConnectionState::Offline, OFFLINE_MESSAGE, false);
    }

    async fn handle_online(self: &Arc<Self>) {
        self.update_status(ConnectionState::Online, CONNECTED_MESSAGE, false);
        self.probe().await;
    }

    async fn probe(self: &Arc<Self>) -> ConnectionState {
        if !self.signal.is_online() {
            self.handle_offline();
            return ConnectionState::Offline;
        }

        let timeout = self.config.offline_timeout();
        let request = HttpRequest::get(self.config.ping_url.as_str())
            .no_cache()
            .timeout(timeout);
        let mut offline = self.signal.subscribe();
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = signal::went_offline(&mut offline) => None,
            result = tokio::time::timeout(timeout, self.transport.send(request)) => Some(result),
        };

        let Some(result) = outcome.filter(|_| self.signal.is_online()) else {
            debug!("Platform went offline during probe");
            self.handle_offline();
            return ConnectionState::Offline;
        };

        match result {
            Err(_) => self.classify_failure(TransportError::Timeout(timeout.as_millis() as u64)),
            Ok(Err(error)) => self.classify_failure(error),
            Ok(Ok(response)) => self.classify_response(response, started.elapsed()),
        }
    }

    fn classify_response(self: &Arc<Self>, response: HttpResponse, elapsed: Duration) -> ConnectionState {
        if !response.is_success() {
            warn!("Liveness probe returned status {}", response.status);
            self.update_status(ConnectionState::Offline, SERVER_ERROR_MESSAGE, false);
            return ConnectionState::Offline;
        }

        self.status.lock().latency = Some(elapsed);
        if elapsed > self.config.slow_threshold() {
            self.update_status(ConnectionState::Slow, &slow_message(elapsed.as_millis()), false);
            ConnectionState::Slow
        } else {
            self.update_status(ConnectionState::Online, CONNECTED_MESSAGE, true);
            ConnectionState::Online
        }
    }

    fn classify_failure(self: &Arc<Self>, error: TransportError) -> ConnectionState {
        if error.is_timeout() {
            warn!("Liveness probe timed out: {}", error);
            self.update_status(ConnectionState::Slow, VERY_SLOW_MESSAGE, false);
            ConnectionState::Slow
        } else {
            warn!("Liveness probe failed: {}", error);
            self.update_status(ConnectionState::Offline, CONNECTION_ERROR_MESSAGE, false);
            ConnectionState::Offline
        }
    }
}

/// Periodic connectivity monitor driving a status element
pub struct ConnectionMonitor<T, D = MemoryDocument> {
    inner: Arc<Inner<T, D>>,
    probe_loop: Mutex<Option<ScheduledTask>>,
    signal_listener: Mutex<Option<ScheduledTask>>,
}

impl<T, D> ConnectionMonitor<T, D>
where
    T: Transport + 'static,
    D: DocumentTree + Send + 'static,
{
    /// Create a monitor; nothing happens until `start`
    pub fn new(transport: T, document: SharedDocument<D>, config: MonitorConfig, signal: NetworkSignal) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                document,
                config,
                signal,
                status: Mutex::new(StatusSnapshot::default()),
                auto_hide: Mutex::new(None),
            }),
            probe_loop: Mutex::new(None),
            signal_listener: Mutex::new(None),
        }
    }

    /// Ensure the status element, follow the platform signal, probe now and
    /// then every check interval. Calling it again while running does nothing.
    pub fn start(&self) {
        let mut probe_loop = self.probe_loop.lock();
        if probe_loop.as_ref().is_some_and(ScheduledTask::is_active) {
            debug!("Connection monitor already running");
            return;
        }

        indicator::ensure_status_element(&mut *self.inner.document.lock(), &self.inner.config);

        let inner = Arc::clone(&self.inner);
        let mut changes = self.inner.signal.subscribe();
        *self.signal_listener.lock() = Some(ScheduledTask::spawn("connection-signal", async move {
            while changes.changed().await.is_ok() {
                let online = *changes.borrow_and_update();
                if online {
                    info!("Platform reports online");
                    inner.handle_online().await;
                } else {
                    info!("Platform reports offline");
                    inner.handle_offline();
                }
            }
        }));

        let inner = Arc::clone(&self.inner);
        let period = self.inner.config.check_interval();
        *probe_loop = Some(ScheduledTask::spawn("connection-probe", async move {
            inner.probe().await;
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.probe().await;
            }
        }));

        info!("Connection monitor started, probing {} every {:?}", self.inner.config.ping_url, period);
    }

    /// Probe once and update the status
    pub async fn probe(&self) -> ConnectionState {
        self.inner.probe().await
    }

    /// React to the platform coming back online
    pub async fn handle_online(&self) {
        self.inner.handle_online().await;
    }

    /// React to the platform going offline
    pub fn handle_offline(&self) {
        self.inner.handle_offline();
    }

    /// Current status
    pub fn status(&self) -> StatusSnapshot {
        self.inner.status.lock().clone()
    }

    /// Whether the repeating probe is scheduled
    pub fn is_running(&self) -> bool {
        self.probe_loop.lock().as_ref().is_some_and(ScheduledTask::is_active)
    }

    /// Stop probing and cancel pending timers; safe to call repeatedly
    pub fn stop(&self) {
        let was_running = self.probe_loop.lock().take().is_some();
        self.signal_listener.lock().take();
        if let Some(mut pending) = self.inner.auto_hide.lock().take() {
            pending.cancel();
        }
        if was_running {
            info!("Connection monitor stopped");
        }
    }
}

impl<T, D> Drop for ConnectionMonitor<T, D> {
    fn drop(&mut self) {
        self.probe_loop.get_mut().take();
        self.signal_listener.get_mut().take();
        self.inner.auto_hide.lock().take();
    }
}
