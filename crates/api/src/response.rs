//! Response bodies for the task endpoints.

use remix_core::job::{Job, RemixResult};
use remix_core::types::JobId;
use serde::Serialize;

/// Body of `201 Created` after a submission.
#[derive(Debug, Serialize)]
pub struct TaskCreated {
    pub task_id: JobId,
}

/// Polling view of a task.
///
/// `error` is present only for failed tasks and `result` only for finished
/// ones.
#[derive(Debug, Serialize)]
pub struct TaskStatus {
    pub status: &'static str,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RemixResult>,
}

impl From<Job> for TaskStatus {
    fn from(job: Job) -> Self {
        Self {
            status: job.status.as_str(),
            progress: job.progress,
            error: job.error,
            result: job.result,
        }
    }
}
