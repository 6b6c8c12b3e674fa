//! Keyed job state shared between submitters, pollers and the pipeline.

use async_trait::async_trait;
use remix_core::job::{Job, JobUpdate};
use remix_core::remix::RemixSpec;
use remix_core::types::JobId;

use crate::error::StoreError;

mod memory;
mod postgres;

pub use memory::InMemoryJobStore;
pub use postgres::PgJobStore;

/// Job record storage.
///
/// Every update goes through [`Job::apply`], so an illegal transition is
/// rejected with [`StoreError::Transition`] and leaves the record unchanged.
/// Updates to one job are serialized; distinct jobs never wait on each other.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Record a new `queued` job at progress 0 and return its id.
    async fn create(&self, spec: &RemixSpec) -> Result<JobId, StoreError>;

    /// Snapshot of the job.
    async fn get(&self, id: JobId) -> Result<Job, StoreError>;

    /// Apply `update` atomically and return the new state.
    async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, StoreError>;
}
