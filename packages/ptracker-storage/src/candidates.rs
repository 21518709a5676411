use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
	Result,
	models::{Candidate, NewCandidate},
};

const SELECT_CANDIDATE: &str = "\
SELECT
	c.candidate_id,
	c.name,
	c.description,
	c.profile_image_url,
	c.created_at,
	(SELECT count(*) FROM promises p WHERE p.candidate_id = c.candidate_id) AS promise_count,
	(SELECT count(*) FROM actions a WHERE a.candidate_id = c.candidate_id) AS action_count
FROM candidates c";

pub async fn insert_candidate<'e, E>(executor: E, candidate: &NewCandidate<'_>) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO candidates (candidate_id, name, description, profile_image_url, created_at)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(candidate.candidate_id)
	.bind(candidate.name)
	.bind(candidate.description)
	.bind(candidate.profile_image_url)
	.bind(candidate.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_candidate<'e, E>(executor: E, candidate_id: Uuid) -> Result<Option<Candidate>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!("{SELECT_CANDIDATE} WHERE c.candidate_id = $1");
	let row =
		sqlx::query_as::<_, Candidate>(&sql).bind(candidate_id).fetch_optional(executor).await?;

	Ok(row)
}

pub async fn list_candidates<'e, E>(executor: E, offset: i64, limit: i64) -> Result<Vec<Candidate>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"{SELECT_CANDIDATE} ORDER BY c.created_at ASC, c.candidate_id ASC OFFSET $1 LIMIT $2"
	);
	let rows = sqlx::query_as::<_, Candidate>(&sql)
		.bind(offset)
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn candidate_exists<'e, E>(executor: E, candidate_id: Uuid) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let exists: bool =
		sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE candidate_id = $1)")
			.bind(candidate_id)
			.fetch_one(executor)
			.await?;

	Ok(exists)
}
