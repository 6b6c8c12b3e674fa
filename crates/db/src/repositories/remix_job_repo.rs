//! Repository for the `remix_jobs` table.
//!
//! Status literals come from [`RemixJobStatus`]; lifecycle rules are not
//! checked here. Callers load a row with [`RemixJobRepo::lock_by_id`],
//! apply the change to the domain [`Job`], and write it back with
//! [`RemixJobRepo::save_state`] inside one transaction.

use remix_core::job::Job;
use remix_core::types::JobId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::remix_job::RemixJobRow;
use crate::models::status::RemixJobStatus;

/// Column list for `remix_jobs` queries.
const COLUMNS: &str = "\
    id, status_id, progress, spec, result, error_message, worker_name, \
    submitted_at, claimed_at, completed_at, created_at, updated_at";

pub struct RemixJobRepo;

impl RemixJobRepo {
    /// Insert a new queued job at progress 0.
    pub async fn create(
        pool: &PgPool,
        id: JobId,
        spec: &serde_json::Value,
    ) -> Result<RemixJobRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO remix_jobs (id, status_id, progress, spec) \
             VALUES ($1, $2, 0, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RemixJobRow>(&query)
            .bind(id)
            .bind(RemixJobStatus::Queued.id())
            .bind(spec)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest queued job and mark it running.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets any number of workers poll the same
    /// table without claiming a job twice.
    pub async fn claim_next(
        pool: &PgPool,
        worker_name: &str,
    ) -> Result<Option<RemixJobRow>, sqlx::Error> {
        let query = format!(
            "UPDATE remix_jobs \
             SET worker_name = $1, claimed_at = NOW(), status_id = $2, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM remix_jobs \
                 WHERE status_id = $3 \
                 ORDER BY submitted_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RemixJobRow>(&query)
            .bind(worker_name)
            .bind(RemixJobStatus::Running.id())
            .bind(RemixJobStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: JobId) -> Result<Option<RemixJobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM remix_jobs WHERE id = $1");
        sqlx::query_as::<_, RemixJobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a job and hold its row lock until the transaction ends.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: JobId,
    ) -> Result<Option<RemixJobRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM remix_jobs WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, RemixJobRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Persist status, progress, result and error of `job`.
    ///
    /// `completed_at` is stamped the first time the job is written in a
    /// terminal state.
    pub async fn save_state(conn: &mut PgConnection, job: &Job) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE remix_jobs \
             SET status_id = $2, progress = $3, result = $4, error_message = $5, \
                 completed_at = CASE WHEN $6 THEN COALESCE(completed_at, NOW()) ELSE completed_at END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(job.id)
        .bind(RemixJobStatus::from(job.status).id())
        .bind(i16::from(job.progress))
        .bind(job.result.as_ref().map(Json))
        .bind(job.error.as_deref())
        .bind(job.status.is_terminal())
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Number of jobs waiting to be claimed.
    pub async fn count_queued(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM remix_jobs WHERE status_id = $1")
            .bind(RemixJobStatus::Queued.id())
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
