//! Queue polling loop.
//!
//! Every `poll_interval` the worker claims queued jobs with
//! [`RemixJobRepo::claim_next`] until the queue is empty. A job is always
//! run to completion; cancellation is only observed between jobs.

use std::sync::Arc;
use std::time::Duration;

use remix_db::repositories::RemixJobRepo;
use remix_pipeline::store::PgJobStore;
use remix_pipeline::{JobStore, PipelineRunner, ProgressReporter};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub struct QueuePoller {
    pool: PgPool,
    store: Arc<dyn JobStore>,
    runner: PipelineRunner,
    worker_name: String,
    poll_interval: Duration,
}

impl QueuePoller {
    pub fn new(pool: PgPool, runner: PipelineRunner, worker_name: String, poll_interval: Duration) -> Self {
        Self {
            store: Arc::new(PgJobStore::new(pool.clone())),
            pool,
            runner,
            worker_name,
            poll_interval,
        }
    }

    /// Run until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            worker = %self.worker_name,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Queue poller started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Queue poller shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }

            while !cancel.is_cancelled() {
                match self.run_next().await {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Poll cycle failed");
                        break;
                    }
                }
            }
        }
    }

    /// Claim and run one job. Returns `false` when the queue is empty.
    pub async fn run_next(&self) -> Result<bool, sqlx::Error> {
        let Some(row) = RemixJobRepo::claim_next(&self.pool, &self.worker_name).await? else {
            return Ok(false);
        };
        let job_id = row.id;
        tracing::info!(%job_id, worker = %self.worker_name, "Job claimed");

        let reporter = ProgressReporter::new(Arc::clone(&self.store), job_id);
        let spec = match row.remix_spec() {
            Ok(spec) => spec,
            Err(e) => {
                tracing::error!(%job_id, error = %e, "Unreadable job spec");
                if let Err(store_err) = reporter.fail(e.to_string()).await {
                    tracing::error!(%job_id, error = %store_err, "Failed to record job failure");
                }
                return Ok(true);
            }
        };

        let span = tracing::info_span!("queued_job", %job_id);
        // The outcome is already recorded on the job row.
        let _ = self.runner.run(&spec, &reporter).instrument(span).await;
        Ok(true)
    }
}
