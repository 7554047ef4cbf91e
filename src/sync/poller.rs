//! Interval-driven synchronization rounds against the task backend.

use crate::api::{TaskBackend, TaskStatus};
use crate::sync::Shared;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Fixed delay between synchronization rounds.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Repeating task that keeps the shared state in sync with the server.
///
/// The loop latches on terminal status: once a round observes `done`,
/// `failed`, or `cancelled`, no further rounds run. `stop` cancels future
/// ticks but never aborts an in-flight round; a round started before a
/// retry or teardown finds the generation changed and drops its results.
pub struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub(crate) fn spawn(
        backend: Arc<dyn TaskBackend>,
        shared: Arc<Shared>,
        task_id: i64,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // A tick that fires while a round is still resolving is dropped,
            // not queued behind it.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if shared.begin_round().is_err() {
                    continue;
                }
                let terminal = run_round(backend.as_ref(), &shared, task_id).await;
                shared.end_round();
                if terminal {
                    debug!(task_id, "terminal status observed, polling stopped");
                    break;
                }
            }
        });

        Self { cancel, handle }
    }

    /// True while the loop is still ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel future ticks. The in-flight round, if any, runs to completion;
    /// its late effects are discarded by the generation check.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// One synchronization round. Returns true once the task is terminal.
///
/// Every fetch failure is transient by design: the step is skipped for this
/// round only and retried on the next tick, leaving cursor and log intact.
async fn run_round(backend: &dyn TaskBackend, shared: &Shared, task_id: i64) -> bool {
    let generation = shared.generation();

    let task = match backend.get_task(task_id).await {
        Ok(task) => task,
        Err(e) => {
            warn!(task_id, error = %e, "status fetch failed, skipping round");
            return false;
        }
    };
    if shared.generation() != generation {
        // Retry or teardown happened while the fetch was pending.
        return false;
    }
    let status = task.status;
    shared.state().task = Some(task);

    if matches!(
        status,
        TaskStatus::Pending | TaskStatus::Running | TaskStatus::Done
    ) {
        let since_id = shared.state().log.cursor();
        match backend.events_since(task_id, since_id).await {
            Ok(batch) if !batch.is_empty() => {
                if shared.generation() != generation {
                    return false;
                }
                let mut state = shared.state();
                let appended = state.log.append_batch(batch);
                debug!(task_id, appended, cursor = state.log.cursor(), "applied event batch");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(task_id, since_id, error = %e, "event fetch failed, will retry with same cursor");
            }
        }
    }

    if status == TaskStatus::Done {
        fetch_results(backend, shared, task_id, generation).await;
    }

    // A bump during the later awaits must not latch the loop either; the
    // status this round saw belongs to the superseded run.
    if shared.generation() != generation {
        return false;
    }
    status.is_terminal()
}

/// Fetch the final report and analyzed videos, once each. Idempotent if a
/// repeated `done` observation gets here again.
async fn fetch_results(backend: &dyn TaskBackend, shared: &Shared, task_id: i64, generation: u64) {
    if shared.state().report.is_none() {
        match backend.get_report(task_id).await {
            Ok(report) => {
                if shared.generation() == generation {
                    shared.state().report = Some(report);
                }
            }
            Err(e) => warn!(task_id, error = %e, "report fetch failed"),
        }
    }

    if shared.state().videos.is_empty() {
        match backend.get_videos(task_id).await {
            Ok(videos) => {
                if shared.generation() == generation {
                    shared.state().videos = videos;
                }
            }
            Err(e) => warn!(task_id, error = %e, "video list fetch failed"),
        }
    }
}
