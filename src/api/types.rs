//! Wire types matching the backend's task and event schemas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle states as reported by the server.
///
/// `Done`, `Failed`, and `Cancelled` are terminal: the server never moves a
/// task out of them on its own. Only an explicit retry flips a task back to
/// `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// True if no further automatic transition occurs from this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// One user-submitted analysis job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub query: String,
    pub platform: String,
    pub max_videos: u32,
    pub status: TaskStatus,
    /// Percent in [0, 100]; only meaningful while `Running`.
    pub progress: f64,
    pub error_message: Option<String>,
    /// Last pipeline step the server recorded. Carried opaquely; phase
    /// display is derived from the event log instead.
    #[serde(default)]
    pub completed_step: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kinds of entries the agent pipeline appends to a task's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thinking,
    ToolCall,
    ToolResult,
    Error,
    Complete,
}

/// One immutable entry in a task's append-only event log.
///
/// Ids are assigned by the server, unique and strictly increasing per task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    pub id: i64,
    pub event_type: EventKind,
    #[serde(default)]
    pub content: String,
    pub tool_name: Option<String>,
    /// Opaque structured text; rendered but never interpreted.
    pub tool_args_json: Option<String>,
    pub tool_result_preview: Option<String>,
    /// Epoch seconds.
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub task_id: i64,
    pub content_markdown: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub platform: String,
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Duration in seconds.
    pub duration: u64,
    pub cover_url: String,
    pub summary: Option<String>,
}

/// Request body for task creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub query: String,
    pub platform: String,
    pub max_videos: u32,
}

/// One page of the task history listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
}
