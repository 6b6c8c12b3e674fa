//! Write path from a running pipeline into the job store.

use std::sync::Arc;

use remix_core::job::{JobUpdate, RemixResult};
use remix_core::types::JobId;

use crate::error::StoreError;
use crate::store::JobStore;

/// Reports lifecycle changes for a single job.
///
/// Each call is written straight through to the store, so the next status
/// poll sees it. Progress values must not decrease; a lower value than the
/// one recorded is rejected by the store with
/// [`TransitionError::ProgressRegression`](remix_core::job::TransitionError).
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn JobStore>,
    job_id: JobId,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn JobStore>, job_id: JobId) -> Self {
        Self { store, job_id }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Mark the job running.
    pub async fn start(&self) -> Result<(), StoreError> {
        self.store.update(self.job_id, JobUpdate::Start).await?;
        tracing::info!(job_id = %self.job_id, "Job started");
        Ok(())
    }

    /// Record a checkpoint below 100.
    pub async fn report(&self, value: u8) -> Result<(), StoreError> {
        self.store
            .update(self.job_id, JobUpdate::Progress(value))
            .await?;
        tracing::debug!(job_id = %self.job_id, progress = value, "Progress recorded");
        Ok(())
    }

    /// Store the result; progress becomes 100 in the same write.
    pub async fn finish(&self, result: RemixResult) -> Result<(), StoreError> {
        self.store
            .update(self.job_id, JobUpdate::Finish(result))
            .await?;
        tracing::info!(job_id = %self.job_id, "Job finished");
        Ok(())
    }

    pub async fn fail(&self, message: impl Into<String>) -> Result<(), StoreError> {
        let message = message.into();
        self.store
            .update(self.job_id, JobUpdate::Fail(message.clone()))
            .await?;
        tracing::warn!(job_id = %self.job_id, error = %message, "Job failed");
        Ok(())
    }
}
