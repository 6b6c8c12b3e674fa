//! [`PgJobStore`] against a live PostgreSQL (`DATABASE_URL`), checked
//! against the in-memory store it stands in for.

use assert_matches::assert_matches;
use remix_core::job::{Job, JobStatus, JobUpdate, RemixResult, TransitionError};
use remix_core::remix::{OutputFormat, RemixSpec};
use remix_core::types::JobId;
use remix_pipeline::store::{InMemoryJobStore, PgJobStore};
use remix_pipeline::{JobStore, StoreError};
use sqlx::PgPool;

fn spec() -> RemixSpec {
    RemixSpec {
        source_url: "https://files.example.com/uploads/a.wav".into(),
        reference_url: None,
        style_text: "late-night warehouse".into(),
        preset_style: Some("techno".into()),
        output_format: OutputFormat::Mp3,
        preview: false,
        target_bpm: None,
    }
}

fn result() -> RemixResult {
    RemixResult {
        output_locator: "https://cdn.example.com/outputs/x.mp3".into(),
        output_format: "mp3".into(),
        bpm: 124.0,
        key: "A#".into(),
    }
}

/// Drive one job through its whole life and return the final snapshot.
async fn run_lifecycle(store: &dyn JobStore) -> Job {
    let id = store.create(&spec()).await.unwrap();
    let queued = store.get(id).await.unwrap();
    assert_eq!(queued.status, JobStatus::Queued);
    assert_eq!(queued.progress, 0);

    assert_eq!(store.update(id, JobUpdate::Start).await.unwrap().status, JobStatus::Running);
    assert_eq!(store.update(id, JobUpdate::Progress(15)).await.unwrap().progress, 15);

    let err = store.update(id, JobUpdate::Progress(10)).await.unwrap_err();
    assert_matches!(
        err,
        StoreError::Transition(TransitionError::ProgressRegression { current: 15, requested: 10 })
    );
    assert_eq!(store.get(id).await.unwrap().progress, 15);

    store.update(id, JobUpdate::Finish(result())).await.unwrap();
    store.get(id).await.unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn lifecycle_is_persisted(pool: PgPool) {
    let store = PgJobStore::new(pool);
    let job = run_lifecycle(&store).await;

    assert_eq!(job.status, JobStatus::Finished);
    assert_eq!(job.progress, 100);
    assert_eq!(job.result, Some(result()));
    assert!(job.error.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn matches_in_memory_store(pool: PgPool) {
    let pg = run_lifecycle(&PgJobStore::new(pool)).await;
    let memory = run_lifecycle(&InMemoryJobStore::new()).await;

    assert_eq!(pg.status, memory.status);
    assert_eq!(pg.progress, memory.progress);
    assert_eq!(pg.result, memory.result);
    assert_eq!(pg.error, memory.error);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn finished_job_rejects_further_updates(pool: PgPool) {
    let store = PgJobStore::new(pool);
    let id = store.create(&spec()).await.unwrap();
    store.update(id, JobUpdate::Start).await.unwrap();
    store.update(id, JobUpdate::Finish(result())).await.unwrap();

    let err = store.update(id, JobUpdate::Fail("late".into())).await.unwrap_err();
    assert_matches!(err, StoreError::Transition(TransitionError::Terminal(JobStatus::Finished)));
    assert!(store.get(id).await.unwrap().error.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn unknown_job_is_not_found(pool: PgPool) {
    let store = PgJobStore::new(pool);
    let id = JobId::new_v4();
    assert_matches!(store.get(id).await, Err(StoreError::NotFound(missing)) if missing == id);
}
