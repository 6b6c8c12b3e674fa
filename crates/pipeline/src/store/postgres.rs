use async_trait::async_trait;
use chrono::Utc;
use remix_core::job::{Job, JobUpdate};
use remix_core::remix::RemixSpec;
use remix_core::types::JobId;
use remix_db::repositories::RemixJobRepo;
use sqlx::PgPool;

use super::JobStore;
use crate::error::StoreError;

/// Store backed by the `remix_jobs` queue table.
///
/// Updates lock the row (`SELECT ... FOR UPDATE`), apply the change to the
/// decoded [`Job`], and write it back in the same transaction.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, spec: &RemixSpec) -> Result<JobId, StoreError> {
        let payload = serde_json::to_value(spec).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let row = RemixJobRepo::create(&self.pool, JobId::now_v7(), &payload).await?;
        Ok(row.id)
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        let row = RemixJobRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        row.to_job().map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = RemixJobRepo::lock_by_id(&mut *tx, id)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        let mut job = row.to_job().map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // Dropping `tx` on an early return rolls back and releases the lock.
        job.apply(update, Utc::now())?;
        RemixJobRepo::save_state(&mut *tx, &job).await?;
        tx.commit().await?;
        Ok(job)
    }
}
