//! Run-history polling.

use super::ControllerEvent;
use crate::api::GitHubClient;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Hard ceiling on one polling session.
pub(crate) const POLL_CEILING: Duration = Duration::from_secs(5 * 60);

/// Runs fetched per poll tick.
pub(crate) const HISTORY_PAGE_SIZE: u32 = 10;

/// Single-owner handle to the active polling task.
///
/// Dropping the handle aborts the task, so storing the replacement in the
/// controller's single slot enforces the one-active-timer invariant
/// structurally.
#[derive(Debug)]
pub(crate) struct PollHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Spawns a polling session fetching history at the client's configured
    /// interval until the ceiling.
    pub(crate) fn spawn(
        client: GitHubClient,
        events: UnboundedSender<ControllerEvent>,
        generation: u64,
    ) -> Self {
        let period = client.poll_interval();

        let task = tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + POLL_CEILING;
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => break,
                    _ = ticker.tick() => {
                        // Fetch failures only log: the front end keeps the
                        // previous snapshot instead of flickering empty.
                        match client.list_all_runs(HISTORY_PAGE_SIZE).await {
                            Ok(list) => {
                                debug!(
                                    generation,
                                    runs = list.workflow_runs.len(),
                                    "History poll tick"
                                );
                                let event = ControllerEvent::HistoryUpdated {
                                    generation,
                                    runs: list.workflow_runs,
                                };
                                if events.send(event).is_err() {
                                    return;
                                }
                            }
                            Err(e) => warn!(generation, error = %e, "History poll failed"),
                        }
                    }
                }
            }

            let _ = events.send(ControllerEvent::PollingStopped { generation });
        });

        Self { generation, task }
    }

    /// Generation this session reports under.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
