use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use remix_core::job::{Job, JobUpdate};
use remix_core::remix::RemixSpec;
use remix_core::types::JobId;
use tokio::sync::{Mutex, RwLock};

use super::JobStore;
use crate::error::StoreError;

/// Process-local store for the local backend.
///
/// The outer map lock is held only to find or insert an entry; each job has
/// its own mutex, so a slow writer on one job never delays another.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Arc<Mutex<Job>>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: JobId) -> Result<Arc<Mutex<Job>>, StoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, _spec: &RemixSpec) -> Result<JobId, StoreError> {
        let id = JobId::now_v7();
        let job = Job::queued(id, Utc::now());
        self.jobs.write().await.insert(id, Arc::new(Mutex::new(job)));
        Ok(id)
    }

    async fn get(&self, id: JobId) -> Result<Job, StoreError> {
        let entry = self.entry(id).await?;
        let job = entry.lock().await;
        Ok(job.clone())
    }

    async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, StoreError> {
        let entry = self.entry(id).await?;
        let mut job = entry.lock().await;
        job.apply(update, Utc::now())?;
        Ok(job.clone())
    }
}
