//! Best-effort side effects
//!
//! Work spawned here runs detached from the request that triggered it. Its
//! failure is logged and dropped; the response path never waits on it.

use std::fmt::Display;
use std::future::Future;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Runner for fire-and-forget tasks such as welcome emails
#[derive(Clone, Default)]
pub struct Notifier {
    tracker: TaskTracker,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach `task`; an `Err` is logged under `label` and otherwise ignored
    pub fn spawn<F, E>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.tracker.spawn(async move {
            match task.await {
                Ok(()) => debug!(task = label, "Best-effort task finished"),
                Err(e) => warn!(task = label, "Best-effort task failed: {}", e),
            }
        });
    }

    /// Number of tasks still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned so far has finished
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
