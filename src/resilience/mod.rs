//! Resilience primitives: bounded retry with exponential backoff, and the
//! process-wide rate-limit snapshot with subscriber fan-out.

use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult, RateLimitInfo};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::time::sleep;

/// Retry executor with exponential backoff.
///
/// Only errors whose [`GitHubError::is_retryable`] is true are retried;
/// everything else is surfaced on the first occurrence. A secondary
/// rate-limit error with an explicit `Retry-After` sleeps for that duration
/// instead of the backoff schedule.
pub struct RetryExecutor {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(
        max_retries: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        multiplier: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
            multiplier,
        }
    }

    /// Executes an operation, retrying transient failures up to the cap.
    ///
    /// Makes at most `max_retries + 1` attempts, sleeping on the calling
    /// path between them.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> GitHubResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = GitHubResult<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() || attempt >= self.max_retries {
                        return Err(self.exhausted(e, attempt));
                    }

                    let delay = e
                        .retry_after()
                        .unwrap_or_else(|| self.calculate_backoff(attempt));

                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient failure"
                    );

                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Calculates the backoff delay for a (zero-indexed) attempt.
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Decorates the final error once retries are used up.
    ///
    /// Secondary rate-limit errors carry the wait the caller would have
    /// slept next, so they can schedule their own retry.
    fn exhausted(&self, error: GitHubError, attempt: u32) -> GitHubError {
        if *error.kind() == GitHubErrorKind::SecondaryRateLimit && error.retry_after().is_none() {
            return error.with_retry_after(self.calculate_backoff(attempt));
        }
        error
    }
}

/// Subscriber callback for rate-limit updates.
pub type RateLimitListener = Arc<dyn Fn(&RateLimitInfo) + Send + Sync>;

/// Latest-value rate-limit snapshot with synchronous subscriber fan-out.
///
/// Every response carrying `X-RateLimit-*` headers overwrites the snapshot
/// and notifies all subscribers in registration order, stale values
/// included. There is no history and no de-duplication.
pub struct RateLimitWatch {
    latest: RwLock<Option<RateLimitInfo>>,
    listeners: Mutex<Vec<(u64, RateLimitListener)>>,
    next_id: AtomicU64,
}

impl Default for RateLimitWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitWatch {
    /// Creates an empty watch.
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the last-observed snapshot, if any response has carried one.
    pub fn latest(&self) -> Option<RateLimitInfo> {
        self.latest
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Stores a snapshot and fans it out to all current subscribers.
    pub fn publish(&self, info: RateLimitInfo) {
        {
            let mut latest = self.latest.write().unwrap_or_else(|p| p.into_inner());
            *latest = Some(info.clone());
        }

        // The lock is released before any callback runs, so listeners may
        // subscribe or unsubscribe on this watch from inside their callback.
        let current: Vec<RateLimitListener> = {
            let listeners = self.listeners.lock().unwrap_or_else(|p| p.into_inner());
            listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in current {
            listener(&info);
        }
    }

    /// Registers a listener; returns its removal id.
    pub fn subscribe(&self, listener: RateLimitListener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((id, listener));
        id
    }

    /// Removes a listener by id. Unknown ids are ignored, so removing twice
    /// is a no-op.
    pub fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }
}
