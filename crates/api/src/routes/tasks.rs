//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// POST   /                -> create_task
/// GET    /{task_id}       -> get_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tasks::create_task))
        .route("/{task_id}", get(tasks::get_task))
}
