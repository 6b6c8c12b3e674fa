//! Backend selection and job hand-off.
//!
//! The backend is chosen once by [`Dispatcher::connect`]: when the queue
//! database answers within the connect timeout, jobs go to the `remix_jobs`
//! table for worker processes to claim; otherwise they run in a bounded
//! in-process pool. A failed connection is logged and never surfaces to callers.

use std::sync::Arc;
use std::time::Duration;

use remix_core::job::Job;
use remix_core::remix::RemixSpec;
use remix_core::types::JobId;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use crate::config::DispatchConfig;
use crate::error::{DispatchError, StoreError};
use crate::progress::ProgressReporter;
use crate::runner::PipelineRunner;
use crate::store::{InMemoryJobStore, JobStore, PgJobStore};

/// Attempts at marking a local job running before it is given up.
const START_ATTEMPTS: u32 = 3;
const START_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Bounded in-process pool running pipelines for the local backend.
pub struct LocalWorkerPool {
    store: Arc<dyn JobStore>,
    runner: PipelineRunner,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    concurrency: usize,
}

impl LocalWorkerPool {
    pub fn new(store: Arc<dyn JobStore>, runner: PipelineRunner, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            store,
            runner,
            permits: Arc::new(Semaphore::new(concurrency)),
            tracker: TaskTracker::new(),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn is_closed(&self) -> bool {
        self.tracker.is_closed()
    }

    /// Queue a run of `spec` for the already created job `job_id`.
    ///
    /// Always accepted, even once [`shutdown`](Self::shutdown) has closed
    /// the pool: a job that is already recorded must still run, and a
    /// pending `shutdown` waits for it.
    pub fn submit(&self, job_id: JobId, spec: RemixSpec) {
        let reporter = ProgressReporter::new(Arc::clone(&self.store), job_id);
        let runner = self.runner.clone();
        let permits = Arc::clone(&self.permits);
        let span = tracing::info_span!("local_job", %job_id);

        self.tracker.spawn(
            async move {
                // The semaphore is never closed, so this only waits.
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if !start_job(&reporter).await {
                    return;
                }
                // Failures are recorded on the job by the runner.
                let _ = runner.run(&spec, &reporter).await;
            }
            .instrument(span),
        );
    }

    /// Stop accepting jobs and wait for every submitted job to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "Draining local worker pool");
        }
        self.tracker.wait().await;
        tracing::info!("Local worker pool stopped");
    }
}

/// Where jobs run.
pub enum Backend {
    /// Queued in PostgreSQL and executed by worker processes.
    Distributed(PgJobStore),
    /// Executed in this process.
    Local(LocalWorkerPool),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Distributed(_) => "distributed",
            Self::Local(_) => "local",
        }
    }
}

/// Mark a local job running, retrying database errors a few times.
async fn start_job(reporter: &ProgressReporter) -> bool {
    for attempt in 1..=START_ATTEMPTS {
        match reporter.start().await {
            Ok(()) => return true,
            Err(StoreError::Database(e)) if attempt < START_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "Could not start job, retrying");
                tokio::time::sleep(START_RETRY_DELAY * attempt).await;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "Could not start job");
                return false;
            }
        }
    }
    false
}

/// Accepts remix requests and returns job ids without waiting for the run.
pub struct Dispatcher {
    backend: Backend,
    store: Arc<dyn JobStore>,
}

impl Dispatcher {
    /// Try the queue database once and pick a backend.
    pub async fn connect(config: &DispatchConfig, runner: PipelineRunner) -> Self {
        let dispatcher = match connect_queue(config).await {
            Some(pool) => Self::distributed(pool),
            None => Self::local(runner, config.local_concurrency),
        };
        tracing::info!(backend = dispatcher.backend_name(), "Dispatcher ready");
        dispatcher
    }

    pub fn distributed(pool: PgPool) -> Self {
        let store = PgJobStore::new(pool);
        Self {
            store: Arc::new(store.clone()),
            backend: Backend::Distributed(store),
        }
    }

    /// Local backend over a fresh in-memory store.
    pub fn local(runner: PipelineRunner, concurrency: usize) -> Self {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        Self {
            backend: Backend::Local(LocalWorkerPool::new(Arc::clone(&store), runner, concurrency)),
            store,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Create a queued job and hand it to the backend.
    ///
    /// Shutdown is checked once, before the job is recorded; after that the
    /// job is always handed over.
    pub async fn enqueue(&self, spec: RemixSpec) -> Result<JobId, DispatchError> {
        if let Backend::Local(pool) = &self.backend {
            if pool.is_closed() {
                return Err(DispatchError::ShuttingDown);
            }
        }

        let job_id = self.store.create(&spec).await?;
        if let Backend::Local(pool) = &self.backend {
            pool.submit(job_id, spec);
        }
        tracing::info!(%job_id, backend = self.backend_name(), "Job enqueued");
        Ok(job_id)
    }

    /// Current state of a job, in the same shape for either backend.
    pub async fn status(&self, job_id: JobId) -> Result<Job, StoreError> {
        self.store.get(job_id).await
    }

    /// Drain the local pool. Distributed jobs are owned by the workers.
    pub async fn shutdown(&self) {
        if let Backend::Local(pool) = &self.backend {
            pool.shutdown().await;
        }
    }
}

/// Connect to, check and migrate the queue database within
/// `config.connect_timeout`. Any failure selects the local backend.
pub async fn connect_queue(config: &DispatchConfig) -> Option<PgPool> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set, using local backend");
        return None;
    };

    let attempt = async {
        let pool = remix_db::create_pool(url, config.connect_timeout)
            .await
            .map_err(|e| e.to_string())?;
        remix_db::health_check(&pool).await.map_err(|e| e.to_string())?;
        remix_db::run_migrations(&pool).await.map_err(|e| e.to_string())?;
        Ok::<_, String>(pool)
    };

    match tokio::time::timeout(config.connect_timeout, attempt).await {
        Ok(Ok(pool)) => {
            tracing::info!("Queue database reachable, using distributed backend");
            Some(pool)
        }
        Ok(Err(error)) => {
            tracing::warn!(%error, "Queue database unavailable, using local backend");
            None
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = config.connect_timeout.as_millis() as u64,
                "Queue database connection timed out, using local backend"
            );
            None
        }
    }
}
