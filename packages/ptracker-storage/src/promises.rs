use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
	Result,
	models::{Action, NewPromise, Promise, PromiseUpdate},
};

pub(crate) const SELECT_PROMISE: &str = "\
SELECT
	p.promise_id,
	p.candidate_id,
	p.text,
	p.status,
	p.created_at,
	p.updated_at,
	(SELECT count(*) FROM citations c WHERE c.promise_id = p.promise_id) AS citation_count,
	(SELECT count(*) FROM promise_action_links l WHERE l.promise_id = p.promise_id) AS action_count
FROM promises p";

pub async fn insert_promise<'e, E>(executor: E, promise: &NewPromise<'_>) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO promises (promise_id, candidate_id, text, status, created_at, updated_at, embedding)
VALUES ($1, $2, $3, $4, $5, $5, $6::text::vector)",
	)
	.bind(promise.promise_id)
	.bind(promise.candidate_id)
	.bind(promise.text)
	.bind(promise.status)
	.bind(promise.now)
	.bind(promise.embedding)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn update_promise<'e, E>(executor: E, update: &PromiseUpdate<'_>) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
UPDATE promises
SET
	text = $2,
	status = $3,
	embedding = COALESCE($4::text::vector, embedding),
	updated_at = $5
WHERE promise_id = $1",
	)
	.bind(update.promise_id)
	.bind(update.text)
	.bind(update.status)
	.bind(update.embedding)
	.bind(update.now)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_promise<'e, E>(
	executor: E,
	candidate_id: Uuid,
	promise_id: Uuid,
) -> Result<Option<Promise>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!("{SELECT_PROMISE} WHERE p.candidate_id = $1 AND p.promise_id = $2");
	let row = sqlx::query_as::<_, Promise>(&sql)
		.bind(candidate_id)
		.bind(promise_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn list_promises<'e, E>(
	executor: E,
	candidate_id: Uuid,
	offset: i64,
	limit: i64,
) -> Result<Vec<Promise>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"{SELECT_PROMISE} WHERE p.candidate_id = $1 ORDER BY p.created_at ASC, p.promise_id ASC OFFSET $2 LIMIT $3"
	);
	let rows = sqlx::query_as::<_, Promise>(&sql)
		.bind(candidate_id)
		.bind(offset)
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Actions linked to `promise_id`.
pub async fn list_promise_actions<'e, E>(executor: E, promise_id: Uuid) -> Result<Vec<Action>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"{} JOIN promise_action_links link ON link.action_id = a.action_id WHERE link.promise_id = $1 ORDER BY a.date ASC, a.action_id ASC",
		crate::actions::SELECT_ACTION
	);
	let rows = sqlx::query_as::<_, Action>(&sql).bind(promise_id).fetch_all(executor).await?;

	Ok(rows)
}
