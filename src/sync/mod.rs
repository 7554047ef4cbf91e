//! Task progress synchronization: event log, derived state, poller, and the
//! retry/cancel lifecycle.

mod log;
mod phase;
mod poller;
mod stats;
#[cfg(test)]
pub(crate) mod testing;

pub use log::EventLog;
pub use phase::{Phase, infer_phase};
pub use poller::{POLL_INTERVAL, Poller};
pub use stats::{ProgressStats, StatExtractor, TextStatExtractor};

use crate::api::{AgentEvent, Report, Task, TaskBackend, Video};
use crate::notify::NoticeBoard;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Everything owned for one observed task. Never persisted; derived values
/// are rebuilt from the full event log whenever asked.
#[derive(Debug, Default)]
pub struct SyncState {
    pub task: Option<Task>,
    pub log: EventLog,
    pub report: Option<Report>,
    pub videos: Vec<Video>,
}

/// State shared between the poller task and the owning session.
pub(crate) struct Shared {
    state: Mutex<SyncState>,
    /// Bumped on retry and teardown. A round snapshots this at its start and
    /// discards everything if it changed underneath the round's awaits.
    generation: AtomicU64,
    /// Set while a round is resolving; a tick firing meanwhile is skipped.
    in_flight: AtomicBool,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SyncState::default()),
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Lock the state, recovering from poisoning. Nothing in this engine is
    /// allowed to be fatal; a poisoned log is still append-only and usable.
    pub(crate) fn state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Claim the in-flight slot for a round. Err means a round is already
    /// pending and this tick should be dropped.
    pub(crate) fn begin_round(&self) -> Result<(), ()> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| ())
    }

    pub(crate) fn end_round(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Point-in-time view of a session, with phase and stats derived fresh from
/// the full log.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub task: Option<Task>,
    pub events: Vec<AgentEvent>,
    pub cursor: i64,
    pub report: Option<Report>,
    pub videos: Vec<Video>,
    pub phase: Option<Phase>,
    pub stats: ProgressStats,
}

/// One task's synchronization session: owns the poller, the shared state,
/// and the retry/cancel lifecycle.
///
/// Sessions are single-task by design. Watching a different task means
/// tearing this one down (`stop`) and starting a fresh session, so state
/// never bleeds across tasks.
pub struct TaskSession {
    backend: Arc<dyn TaskBackend>,
    task_id: i64,
    poll_interval: Duration,
    shared: Arc<Shared>,
    poller: Poller,
    extractor: Box<dyn StatExtractor>,
    pub notices: NoticeBoard,
}

impl TaskSession {
    /// Begin polling `task_id` immediately.
    #[must_use]
    pub fn start(
        backend: Arc<dyn TaskBackend>,
        task_id: i64,
        poll_interval: Duration,
        notice_ttl: Duration,
    ) -> Self {
        let shared = Arc::new(Shared::new());
        let poller = Poller::spawn(backend.clone(), shared.clone(), task_id, poll_interval);
        Self {
            backend,
            task_id,
            poll_interval,
            shared,
            poller,
            extractor: Box::new(TextStatExtractor),
            notices: NoticeBoard::new(notice_ttl),
        }
    }

    #[must_use]
    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    /// True while the poller is still ticking (no terminal status observed).
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let state = self.shared.state();
        Snapshot {
            task: state.task.clone(),
            events: state.log.events().to_vec(),
            cursor: state.log.cursor(),
            report: state.report.clone(),
            videos: state.videos.clone(),
            phase: infer_phase(state.log.events()),
            stats: self.extractor.extract(state.log.events()),
        }
    }

    /// Rerun a failed or cancelled task.
    ///
    /// On success every piece of locally derived state is rebuilt from
    /// scratch: the log and cursor reset, report and videos drop, the task
    /// snapshot comes from the server response, and polling resumes if the
    /// previous run had latched on a terminal status. On failure local state
    /// is left exactly as it was.
    pub async fn retry(&mut self) {
        match self.backend.retry_task(self.task_id).await {
            Ok(task) => {
                // Orphan any round still in flight from the old run.
                self.shared.bump_generation();
                {
                    let mut state = self.shared.state();
                    state.log.clear();
                    state.report = None;
                    state.videos.clear();
                    state.task = Some(task);
                }
                if !self.poller.is_running() {
                    self.poller = Poller::spawn(
                        self.backend.clone(),
                        self.shared.clone(),
                        self.task_id,
                        self.poll_interval,
                    );
                }
                self.notices.show("task restarted");
            }
            Err(e) => self.notices.show(format!("retry failed: {e}")),
        }
    }

    /// Ask the server to cancel the task. The poller is not stopped here; it
    /// halts on its own once it observes the terminal status.
    pub async fn cancel(&mut self) {
        match self.backend.cancel_task(self.task_id).await {
            Ok(task) => {
                self.shared.state().task = Some(task);
                self.notices.show("cancel requested");
            }
            Err(e) => self.notices.show(format!("cancel failed: {e}")),
        }
    }

    /// Tear the session down: no more ticks, and any in-flight round's late
    /// response is discarded.
    pub fn stop(&mut self) {
        self.shared.bump_generation();
        self.poller.stop();
    }
}
