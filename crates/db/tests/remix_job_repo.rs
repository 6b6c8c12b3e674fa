//! Queue behaviour against a live PostgreSQL (`DATABASE_URL`).

use chrono::Utc;
use remix_core::job::{JobStatus, JobUpdate, RemixResult};
use remix_core::types::JobId;
use remix_db::repositories::RemixJobRepo;
use sqlx::PgPool;

fn spec() -> serde_json::Value {
    serde_json::json!({
        "source_url": "https://files.example.com/a.wav",
        "reference_url": null,
        "style_text": "warehouse",
        "preset_style": null,
        "output_format": "mp3"
    })
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn create_then_claim_once(pool: PgPool) {
    let id = JobId::new_v4();
    let row = RemixJobRepo::create(&pool, id, &spec()).await.unwrap();
    assert_eq!(row.to_job().unwrap().status, JobStatus::Queued);
    assert_eq!(RemixJobRepo::count_queued(&pool).await.unwrap(), 1);

    let claimed = RemixJobRepo::claim_next(&pool, "w1").await.unwrap().unwrap();
    assert_eq!(claimed.id, id);
    assert_eq!(claimed.to_job().unwrap().status, JobStatus::Running);
    assert_eq!(claimed.worker_name.as_deref(), Some("w1"));

    assert!(RemixJobRepo::claim_next(&pool, "w2").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn saved_state_is_read_back(pool: PgPool) {
    let id = JobId::new_v4();
    RemixJobRepo::create(&pool, id, &spec()).await.unwrap();
    RemixJobRepo::claim_next(&pool, "w1").await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let mut job = RemixJobRepo::lock_by_id(&mut *tx, id)
        .await
        .unwrap()
        .unwrap()
        .to_job()
        .unwrap();
    job.apply(JobUpdate::Progress(60), Utc::now()).unwrap();
    job.apply(
        JobUpdate::Finish(RemixResult {
            output_locator: "https://cdn.example.com/outputs/x.mp3".into(),
            output_format: "mp3".into(),
            bpm: 128.0,
            key: "C".into(),
        }),
        Utc::now(),
    )
    .unwrap();
    RemixJobRepo::save_state(&mut *tx, &job).await.unwrap();
    tx.commit().await.unwrap();

    let row = RemixJobRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(row.completed_at.is_some());
    let stored = row.to_job().unwrap();
    assert_eq!(stored.status, JobStatus::Finished);
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.result.unwrap().bpm, 128.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a PostgreSQL database"]
async fn unknown_id_is_none(pool: PgPool) {
    assert!(RemixJobRepo::find_by_id(&pool, JobId::new_v4())
        .await
        .unwrap()
        .is_none());
}
