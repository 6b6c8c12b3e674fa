//! Row model for the `remix_jobs` table.

use remix_core::error::CoreError;
use remix_core::job::{Job, RemixResult};
use remix_core::remix::RemixSpec;
use remix_core::types::{JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{RemixJobStatus, StatusId};

/// A row from the `remix_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RemixJobRow {
    pub id: JobId,
    pub status_id: StatusId,
    pub progress: i16,
    pub spec: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub worker_name: Option<String>,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RemixJobRow {
    /// Decode into the domain job record.
    pub fn to_job(&self) -> Result<Job, CoreError> {
        let status = RemixJobStatus::from_id(self.status_id).ok_or_else(|| {
            CoreError::Internal(format!("job {} has unknown status_id {}", self.id, self.status_id))
        })?;
        let progress = u8::try_from(self.progress).map_err(|_| {
            CoreError::Internal(format!("job {} has invalid progress {}", self.id, self.progress))
        })?;
        let result = self
            .result
            .clone()
            .map(serde_json::from_value::<RemixResult>)
            .transpose()
            .map_err(|e| CoreError::Internal(format!("job {} has malformed result: {e}", self.id)))?;

        Ok(Job {
            id: self.id,
            status: status.into(),
            progress,
            result,
            error: self.error_message.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// Decode the stored request.
    pub fn remix_spec(&self) -> Result<RemixSpec, CoreError> {
        serde_json::from_value(self.spec.clone())
            .map_err(|e| CoreError::Internal(format!("job {} has malformed spec: {e}", self.id)))
    }
}
