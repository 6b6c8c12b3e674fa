//! Handlers for the `/tasks` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use remix_core::error::CoreError;
use remix_core::remix::SubmitRemix;
use remix_core::types::JobId;

use crate::error::{AppError, AppResult};
use crate::response::{TaskCreated, TaskStatus};
use crate::state::AppState;

/// POST /api/v1/tasks
///
/// Validate a remix request and enqueue it. Returns 201 with the task id as
/// soon as the job is recorded; the pipeline runs in the background.
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<SubmitRemix>,
) -> AppResult<impl IntoResponse> {
    let spec = input.into_spec()?;
    let task_id = state.dispatcher.enqueue(spec).await?;

    tracing::info!(%task_id, "Task submitted");

    Ok((StatusCode::CREATED, Json(TaskCreated { task_id })))
}

/// GET /api/v1/tasks/{task_id}
///
/// Ids that are not UUIDs can never name a task, so they are reported as
/// not found rather than as a bad request.
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskStatus>> {
    let id: JobId = task_id.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id.clone(),
        })
    })?;

    let job = state.dispatcher.status(id).await?;
    Ok(Json(TaskStatus::from(job)))
}
