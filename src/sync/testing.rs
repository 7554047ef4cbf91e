//! Scripted `TaskBackend` double for poller and lifecycle tests.

use crate::api::{AgentEvent, ApiError, EventKind, Report, Task, TaskBackend, TaskStatus, Video};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn task_with_status(id: i64, status: TaskStatus) -> Task {
    Task {
        id,
        query: "rust async runtime internals".to_string(),
        platform: "bilibili".to_string(),
        max_videos: 10,
        status,
        progress: 0.0,
        error_message: None,
        completed_step: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn tool_call(id: i64, tool: &str) -> AgentEvent {
    AgentEvent {
        id,
        event_type: EventKind::ToolCall,
        content: String::new(),
        tool_name: Some(tool.to_string()),
        tool_args_json: None,
        tool_result_preview: None,
        timestamp: id as f64,
    }
}

pub(crate) fn tool_result(id: i64, tool: &str, content: &str) -> AgentEvent {
    AgentEvent {
        id,
        event_type: EventKind::ToolResult,
        content: content.to_string(),
        tool_name: Some(tool.to_string()),
        tool_args_json: None,
        tool_result_preview: None,
        timestamp: id as f64,
    }
}

/// Backend double driven by queues: statuses and event batches are consumed
/// in order, then the base status repeats and event fetches return empty.
pub(crate) struct ScriptedBackend {
    base_status: Mutex<TaskStatus>,
    statuses: Mutex<VecDeque<TaskStatus>>,
    fail_task_fetch: AtomicBool,
    event_batches: Mutex<VecDeque<Result<Vec<AgentEvent>, ApiError>>>,
    retry_responses: Mutex<VecDeque<Result<Task, ApiError>>>,
    cancel_responses: Mutex<VecDeque<Result<Task, ApiError>>>,
    recorded_since_ids: Mutex<Vec<i64>>,
    pub(crate) task_calls: AtomicUsize,
    pub(crate) event_calls: AtomicUsize,
    pub(crate) report_calls: AtomicUsize,
    pub(crate) video_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub(crate) fn new(base_status: TaskStatus) -> Arc<Self> {
        Arc::new(Self {
            base_status: Mutex::new(base_status),
            statuses: Mutex::new(VecDeque::new()),
            fail_task_fetch: AtomicBool::new(false),
            event_batches: Mutex::new(VecDeque::new()),
            retry_responses: Mutex::new(VecDeque::new()),
            cancel_responses: Mutex::new(VecDeque::new()),
            recorded_since_ids: Mutex::new(Vec::new()),
            task_calls: AtomicUsize::new(0),
            event_calls: AtomicUsize::new(0),
            report_calls: AtomicUsize::new(0),
            video_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn set_base_status(&self, status: TaskStatus) {
        *self.base_status.lock().unwrap() = status;
    }

    /// Statuses to serve before falling back to the base status.
    pub(crate) fn push_statuses(&self, statuses: &[TaskStatus]) {
        self.statuses.lock().unwrap().extend(statuses.iter().copied());
    }

    /// Make the next status fetch fail once.
    pub(crate) fn fail_next_task_fetch(&self) {
        self.fail_task_fetch.store(true, Ordering::SeqCst);
    }

    pub(crate) fn push_events(&self, batch: Result<Vec<AgentEvent>, ApiError>) {
        self.event_batches.lock().unwrap().push_back(batch);
    }

    pub(crate) fn push_retry(&self, response: Result<Task, ApiError>) {
        self.retry_responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn push_cancel(&self, response: Result<Task, ApiError>) {
        self.cancel_responses.lock().unwrap().push_back(response);
    }

    /// `since_id` values seen by `events_since`, in call order.
    pub(crate) fn since_ids(&self) -> Vec<i64> {
        self.recorded_since_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskBackend for ScriptedBackend {
    async fn get_task(&self, task_id: i64) -> Result<Task, ApiError> {
        self.task_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_task_fetch.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Api("HTTP 503: Service Unavailable".into()));
        }
        let status = match self.statuses.lock().unwrap().pop_front() {
            Some(status) => status,
            None => *self.base_status.lock().unwrap(),
        };
        Ok(task_with_status(task_id, status))
    }

    async fn events_since(&self, _task_id: i64, since_id: i64) -> Result<Vec<AgentEvent>, ApiError> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        self.recorded_since_ids.lock().unwrap().push(since_id);
        match self.event_batches.lock().unwrap().pop_front() {
            Some(batch) => batch,
            None => Ok(Vec::new()),
        }
    }

    async fn get_report(&self, task_id: i64) -> Result<Report, ApiError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Report {
            id: 1,
            task_id,
            content_markdown: "# Analysis Report".to_string(),
            created_at: Utc::now(),
        })
    }

    async fn get_videos(&self, _task_id: i64) -> Result<Vec<Video>, ApiError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn retry_task(&self, _task_id: i64) -> Result<Task, ApiError> {
        self.retry_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Api("retry not scripted".into())))
    }

    async fn cancel_task(&self, _task_id: i64) -> Result<Task, ApiError> {
        self.cancel_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Api("cancel not scripted".into())))
    }
}
