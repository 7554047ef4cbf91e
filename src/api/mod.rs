//! Task backend API: wire types, HTTP client, and the polling seam.

mod backend;
mod client;
mod types;

pub use backend::TaskBackend;
pub use client::ApiClient;
pub use types::{AgentEvent, EventKind, NewTask, Report, Task, TaskPage, TaskStatus, Video};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    BaseUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}
