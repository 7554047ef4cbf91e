//! HTTP client for the task backend.

use crate::api::{AgentEvent, ApiError, NewTask, Report, Task, TaskBackend, TaskPage, Video};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use url::Url;

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client binding the backend's task endpoints.
#[derive(Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://127.0.0.1:8000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|e| ApiError::BaseUrl(format!("{base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;
        Self::read_json(response).await
    }

    /// POST with no body, for lifecycle actions like retry and cancel.
    async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Api(format!("HTTP {status}: {text}")));
        }

        serde_json::from_str(&text)
            .map_err(|e| ApiError::Api(format!("failed to parse response: {e}\nBody: {text}")))
    }

    /// Submit a new analysis task.
    pub async fn create_task(&self, new: &NewTask) -> Result<Task, ApiError> {
        self.post_json("/tasks", new).await
    }

    /// Page through the task history, newest first.
    pub async fn list_tasks(&self, skip: u32, limit: u32) -> Result<TaskPage, ApiError> {
        self.get_json(&format!("/tasks?skip={skip}&limit={limit}")).await
    }

    /// Delete a task and everything stored for it.
    pub async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        let url = format!("{}/tasks/{task_id}", self.base_url);
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(ApiError::Api(format!("HTTP {status}: {text}")));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn get_task(&self, task_id: i64) -> Result<Task, ApiError> {
        self.get_json(&format!("/tasks/{task_id}")).await
    }

    async fn events_since(&self, task_id: i64, since_id: i64) -> Result<Vec<AgentEvent>, ApiError> {
        self.get_json(&format!("/tasks/{task_id}/events?since_id={since_id}"))
            .await
    }

    async fn get_report(&self, task_id: i64) -> Result<Report, ApiError> {
        self.get_json(&format!("/tasks/{task_id}/report")).await
    }

    async fn get_videos(&self, task_id: i64) -> Result<Vec<Video>, ApiError> {
        self.get_json(&format!("/tasks/{task_id}/videos")).await
    }

    async fn retry_task(&self, task_id: i64) -> Result<Task, ApiError> {
        self.post_empty(&format!("/tasks/{task_id}/retry")).await
    }

    async fn cancel_task(&self, task_id: i64) -> Result<Task, ApiError> {
        self.post_empty(&format!("/tasks/{task_id}/cancel")).await
    }
}
