//! Formatting helpers and input debouncing.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Formats a timestamp for operator display, or "unknown" when absent.
#[must_use]
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "unknown".to_string(),
    }
}

/// Formats the wall-clock span between two timestamps.
///
/// Buckets match what an operator scanning run history needs: seconds under
/// a minute, whole minutes under an hour, hours and minutes beyond.
#[must_use]
pub fn format_duration(start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return "unknown".to_string();
    };

    let secs = (*end - *start).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

/// Delays a callback until input has settled.
///
/// Each [`call`][Debouncer::call] cancels the previously pending callback,
/// so at most one fires after the delay. Front ends use this to re-validate
/// the image list as the operator types without validating every keystroke.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Creates a debouncer with the given settle delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedules `callback` after the delay, cancelling any pending one.
    pub fn call<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Cancels any pending callback.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
