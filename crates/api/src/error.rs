use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use remix_core::error::CoreError;
use remix_pipeline::{DispatchError, StoreError};
use remix_storage::StorageError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, job-store, dispatch and storage errors and implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `remix_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Configuration(msg) => {
                    (StatusCode::NOT_IMPLEMENTED, "CONFIGURATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => internal(msg),
            },

            // --- Job store ---
            AppError::Store(err) => match err {
                StoreError::NotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Task with id {id} not found"),
                ),
                StoreError::Transition(t) => (StatusCode::CONFLICT, "CONFLICT", t.to_string()),
                StoreError::Database(_) | StoreError::Corrupt(_) => internal(&err.to_string()),
            },

            AppError::Dispatch(err) => match err {
                DispatchError::Store(_) => internal(&err.to_string()),
                DispatchError::ShuttingDown => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SHUTTING_DOWN",
                    err.to_string(),
                ),
            },

            // --- Object storage ---
            AppError::Storage(err) => match err {
                StorageError::Configuration(_) | StorageError::InvalidConfig(_) => (
                    StatusCode::NOT_IMPLEMENTED,
                    "CONFIGURATION_ERROR",
                    err.to_string(),
                ),
                StorageError::Request(_) | StorageError::Io(_) => internal(&err.to_string()),
            },
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log the real cause and hand the client a sanitized 500.
fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
