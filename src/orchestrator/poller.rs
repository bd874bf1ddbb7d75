//! Polling budgets, time source and cancellation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

const DEFAULT_QUEUE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Budgets and cadence for waiting on a build.
///
/// Time is accounted in whole intervals: each observation of a queued build
/// adds one interval to the queue clock and each observation of a running
/// build adds one to the run clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Longest time a build may stay queued.
    pub queue_timeout: Duration,
    /// Longest time a build may run.
    pub run_timeout: Duration,
    /// Delay between state queries.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            queue_timeout: DEFAULT_QUEUE_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Source of delays between polls.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Shared flag that interrupts waiting.
///
/// Clones observe the same flag, so the CLI can hand one clone to a Ctrl-C
/// handler and another to the orchestrator.
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Creates an untriggered token.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers cancellation for every clone.
    pub fn cancel(&self) {
        self.sender.send_modify(|cancelled| *cancelled = true);
    }

    /// Returns true once [`CancelToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // The sender lives in `self`, so the channel cannot close here.
            std::future::pending::<()>().await;
        }
    }
}
