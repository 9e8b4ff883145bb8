/*!
 * Platform connectivity signal shared with the connection monitor
 */

use std::sync::Arc;
use tokio::sync::watch;

/// Platform online/offline signal
///
/// Stands in for the browser's `navigator.onLine` flag and its `online` /
/// `offline` events: the current value can be read at any time and
/// subscribers are woken on every change.
#[derive(Debug, Clone)]
pub struct NetworkSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for NetworkSignal {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkSignal {
    /// Create a signal with an initial state
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Whether the platform currently reports connectivity
    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Report a connectivity change; subscribers are only woken when the
    /// value actually changes
    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Receiver for connectivity changes, with the current value marked seen
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

/// Resolve once the receiver observes the offline state
pub(crate) async fn went_offline(receiver: &mut watch::Receiver<bool>) {
    if receiver.wait_for(|online| !*online).await.is_err() {
        std::future::pending::<()>().await;
    }
}
