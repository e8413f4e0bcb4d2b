//! Reconnect policy and the cancelable one-shot timer that drives it.

use std::time::Duration;

use tokio::{task::JoinHandle, time::Instant};

/// Delay between a close and the next connection attempt
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

/// Flat-interval reconnect policy
///
/// `max_attempts: None` retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::flat(DEFAULT_RECONNECT_INTERVAL)
    }
}

impl RetryPolicy {
    /// Retry forever with a fixed interval.
    pub fn flat(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Stop retrying after `max_attempts` consecutive failed attempts.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Check if another reconnection attempt is allowed.
    ///
    /// # Arguments
    ///
    /// * `attempt` - Reconnection attempts already made since the last successful open
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }

    /// Delay before the next attempt, or `None` when attempts are exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        self.should_retry(attempt).then_some(self.interval)
    }
}

/// Handle to a pending reconnect.
///
/// At most one timer is pending; scheduling again replaces it. Dropping the
/// handle cancels the timer.
#[derive(Debug, Default)]
pub struct ReconnectTimer {
    handle: Option<JoinHandle<()>>,
}

impl ReconnectTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire` once after `delay`, replacing any pending timer.
    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let deadline = Instant::now() + delay;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire();
        }));
    }

    /// Cancel the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ReconnectTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
