/*!
 * Cancellable background tasks.
 *
 * Every timer a component creates (repeating probes, auto-hide, banner
 * removal, auto-refresh) is a `ScheduledTask` owned by that component. Dropping
 * or cancelling the task aborts it, so repeated initialization never leaks
 * timers.
 */

use log::trace;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to a spawned background task that is aborted on cancel or drop
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn a future as a named task
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        trace!("Scheduling task '{}'", name);
        Self {
            name,
            handle: Some(tokio::spawn(future)),
        }
    }

    /// Run `action` once after `delay`
    pub fn after<F, Fut>(name: &'static str, delay: Duration, action: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(name, async move {
            tokio::time::sleep(delay).await;
            action().await;
        })
    }

    /// Run `action` every `period`, the first time after one full period
    pub fn every<F, Fut>(name: &'static str, period: Duration, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(name, async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                action().await;
            }
        })
    }

    /// Task name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Abort the task; safe to call repeatedly
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("Cancelling task '{}'", self.name);
            handle.abort();
        }
    }

    /// Whether the task is neither cancelled nor finished
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
