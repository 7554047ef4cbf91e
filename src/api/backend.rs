//! The seam the sync engine polls through.

use crate::api::{AgentEvent, ApiError, Report, Task, Video};
use async_trait::async_trait;

/// Backend operations the synchronization session depends on.
///
/// `ApiClient` implements this over HTTP; poller and lifecycle tests script
/// it with canned responses.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Current task snapshot (status, progress, error message).
    async fn get_task(&self, task_id: i64) -> Result<Task, ApiError>;

    /// Events with id strictly greater than `since_id`, in ascending id order.
    async fn events_since(&self, task_id: i64, since_id: i64) -> Result<Vec<AgentEvent>, ApiError>;

    /// Final report for a finished task.
    async fn get_report(&self, task_id: i64) -> Result<Report, ApiError>;

    /// Videos analyzed for a finished task.
    async fn get_videos(&self, task_id: i64) -> Result<Vec<Video>, ApiError>;

    /// Move a failed or cancelled task back to `Pending` and rerun it.
    async fn retry_task(&self, task_id: i64) -> Result<Task, ApiError>;

    /// Ask the server to cancel a pending or running task.
    async fn cancel_task(&self, task_id: i64) -> Result<Task, ApiError>;
}
