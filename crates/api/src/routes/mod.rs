pub mod health;
pub mod tasks;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks      -> tasks::router()
/// /uploads    -> uploads::router()
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/tasks", tasks::router())
        .nest("/uploads", uploads::router())
}
