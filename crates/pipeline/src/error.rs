use remix_core::job::TransitionError;
use remix_core::stage::Stage;
use remix_core::types::JobId;

/// Errors from a [`JobStore`](crate::store::JobStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Job {0} not found")]
    NotFound(JobId),

    /// The update is not allowed in the job's current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Corrupt job record: {0}")]
    Corrupt(String),
}

/// A failed pipeline stage. The message becomes the job's error text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{stage} stage failed: {message}")]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn new(stage: Stage, cause: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: cause.to_string(),
        }
    }
}

/// Errors from [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The local pool has been closed for shutdown.
    #[error("Dispatcher is shutting down")]
    ShuttingDown,
}
