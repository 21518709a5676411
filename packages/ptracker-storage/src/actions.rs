use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
	Result,
	models::{Action, ActionUpdate, NewAction, Promise},
};

pub(crate) const SELECT_ACTION: &str = "\
SELECT
	a.action_id,
	a.candidate_id,
	a.text,
	a.date,
	a.created_at,
	a.updated_at,
	(SELECT count(*) FROM citations c WHERE c.action_id = a.action_id) AS citation_count,
	(SELECT count(*) FROM promise_action_links l WHERE l.action_id = a.action_id) AS promise_count
FROM actions a";

pub async fn insert_action<'e, E>(executor: E, action: &NewAction<'_>) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
INSERT INTO actions (action_id, candidate_id, text, date, created_at, updated_at, embedding)
VALUES ($1, $2, $3, $4, $5, $5, $6::text::vector)",
	)
	.bind(action.action_id)
	.bind(action.candidate_id)
	.bind(action.text)
	.bind(action.date)
	.bind(action.now)
	.bind(action.embedding)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn update_action<'e, E>(executor: E, update: &ActionUpdate<'_>) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	sqlx::query(
		"\
UPDATE actions
SET
	text = $2,
	date = $3,
	embedding = COALESCE($4::text::vector, embedding),
	updated_at = $5
WHERE action_id = $1",
	)
	.bind(update.action_id)
	.bind(update.text)
	.bind(update.date)
	.bind(update.embedding)
	.bind(update.now)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_action<'e, E>(
	executor: E,
	candidate_id: Uuid,
	action_id: Uuid,
) -> Result<Option<Action>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!("{SELECT_ACTION} WHERE a.candidate_id = $1 AND a.action_id = $2");
	let row = sqlx::query_as::<_, Action>(&sql)
		.bind(candidate_id)
		.bind(action_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn list_actions<'e, E>(
	executor: E,
	candidate_id: Uuid,
	offset: i64,
	limit: i64,
) -> Result<Vec<Action>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"{SELECT_ACTION} WHERE a.candidate_id = $1 ORDER BY a.date DESC, a.action_id ASC OFFSET $2 LIMIT $3"
	);
	let rows = sqlx::query_as::<_, Action>(&sql)
		.bind(candidate_id)
		.bind(offset)
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

/// Promises linked to `action_id`.
pub async fn list_action_promises<'e, E>(executor: E, action_id: Uuid) -> Result<Vec<Promise>>
where
	E: Executor<'e, Database = Postgres>,
{
	let sql = format!(
		"{} JOIN promise_action_links link ON link.promise_id = p.promise_id WHERE link.action_id = $1 ORDER BY p.created_at ASC, p.promise_id ASC",
		crate::promises::SELECT_PROMISE
	);
	let rows = sqlx::query_as::<_, Promise>(&sql).bind(action_id).fetch_all(executor).await?;

	Ok(rows)
}
