use serde_json::Value;
use sqlx::{Executor, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, db::Db, models::AnalysisJob};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_RUNNING: &str = "RUNNING";
pub const STATUS_DONE: &str = "DONE";
pub const STATUS_FAILED: &str = "FAILED";

const SELECT_JOB: &str = "\
SELECT
	job_id,
	candidate_id,
	urls,
	status,
	last_error,
	report,
	created_at,
	updated_at
FROM analysis_jobs";

pub async fn enqueue_job<'e, E>(
	executor: E,
	job_id: Uuid,
	candidate_id: Uuid,
	urls: &[String],
	now: OffsetDateTime,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO analysis_jobs (job_id, candidate_id, urls, status, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $5)",
	)
	.bind(job_id)
	.bind(candidate_id)
	.bind(serde_json::json!(urls))
	.bind(STATUS_PENDING)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(())
}

/// Claims the oldest pending job and marks it running.
pub async fn claim_next_job(db: &Db, now: OffsetDateTime) -> Result<Option<AnalysisJob>> {
	let mut tx = db.pool.begin().await?;
	let sql = format!(
		"{SELECT_JOB} WHERE status = $1 ORDER BY created_at ASC, job_id ASC LIMIT 1 FOR UPDATE SKIP LOCKED"
	);
	let row = sqlx::query_as::<_, AnalysisJob>(&sql)
		.bind(STATUS_PENDING)
		.fetch_optional(&mut *tx)
		.await?;
	let job = if let Some(mut job) = row {
		sqlx::query("UPDATE analysis_jobs SET status = $1, updated_at = $2 WHERE job_id = $3")
			.bind(STATUS_RUNNING)
			.bind(now)
			.bind(job.job_id)
			.execute(&mut *tx)
			.await?;

		job.status = STATUS_RUNNING.to_string();
		job.updated_at = now;

		Some(job)
	} else {
		None
	};

	tx.commit().await?;

	Ok(job)
}

pub async fn mark_job_done<'e, E>(
	executor: E,
	job_id: Uuid,
	report: &Value,
	now: OffsetDateTime,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"UPDATE analysis_jobs SET status = $1, report = $2, last_error = NULL, updated_at = $3 WHERE job_id = $4",
	)
	.bind(STATUS_DONE)
	.bind(report)
	.bind(now)
	.bind(job_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn mark_job_failed<'e, E>(
	executor: E,
	job_id: Uuid,
	error: &str,
	now: OffsetDateTime,
) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"UPDATE analysis_jobs SET status = $1, last_error = $2, updated_at = $3 WHERE job_id = $4",
	)
	.bind(STATUS_FAILED)
	.bind(error)
	.bind(now)
	.bind(job_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_job<'e, E>(executor: E, job_id: Uuid) -> Result<Option<AnalysisJob>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!("{SELECT_JOB} WHERE job_id = $1");
	let row = sqlx::query_as::<_, AnalysisJob>(&sql).bind(job_id).fetch_optional(executor).await?;

	Ok(row)
}
