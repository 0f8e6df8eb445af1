//! State shared between the scheduler and its worker.

use std::sync::Arc;
use std::time::Duration;

use mailbox_filter::Exclusions;
use supervisor::RetryPolicy;
use unseen_tracker::UnseenTracker;

/// Retry once, ten seconds after a transient failure.
pub const DEFAULT_RETRY: RetryPolicy = RetryPolicy {
    retries: 1,
    delay: Duration::from_secs(10),
};

/// Everything a polling run needs besides the transport and notifier.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    /// Per-mailbox boundaries, kept across cycles.
    ///
    /// The worker holds the lock for a whole cycle.
    pub tracker: Arc<tokio::sync::Mutex<UnseenTracker>>,

    /// Mailboxes to skip.
    pub exclusions: Arc<Exclusions>,

    /// Delay between cycles; `None` runs a single cycle.
    pub period: Option<Duration>,

    /// What to do on transient failures.
    pub retry: RetryPolicy,
}

impl SchedulerContext {
    /// A fresh context with an empty tracker and the default retry policy.
    pub fn new(exclusions: Exclusions, period: Option<Duration>) -> Self {
        Self {
            tracker: Arc::new(tokio::sync::Mutex::new(UnseenTracker::new())),
            exclusions: Arc::new(exclusions),
            period,
            retry: DEFAULT_RETRY,
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
