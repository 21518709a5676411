//! Queries shared by promises and actions: embedding proximity, ownership, links, citations.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use ptracker_domain::EntityKind;

use crate::{
	Result,
	models::{Citation, CitationParent, NewCitation},
};

pub(crate) fn table(kind: EntityKind) -> &'static str {
	match kind {
		EntityKind::Promise => "promises",
		EntityKind::Action => "actions",
	}
}

pub(crate) fn id_column(kind: EntityKind) -> &'static str {
	match kind {
		EntityKind::Promise => "promise_id",
		EntityKind::Action => "action_id",
	}
}

/// Ids of `kind` rows owned by `candidate_id` whose cosine distance to `vec` is below
/// `dist_threshold`, nearest first.
///
/// `vec` must be a pgvector literal of the column's dimension. `limit = None` returns every
/// match.
pub async fn find_within_distance<'e, E>(
	executor: E,
	kind: EntityKind,
	candidate_id: Uuid,
	vec: &str,
	dist_threshold: f32,
	exclude_id: Option<Uuid>,
	limit: Option<i64>,
) -> Result<Vec<Uuid>>
where
	E: Executor<'e, Database = Postgres>,
{
	let table = table(kind);
	let id = id_column(kind);
	let sql = format!(
		"\
SELECT {id}
FROM {table}
WHERE candidate_id = $1
	AND ($2::uuid IS NULL OR {id} <> $2)
	AND (embedding <=> $3::text::vector) < $4
ORDER BY embedding <=> $3::text::vector ASC, {id} ASC
LIMIT $5"
	);
	let ids: Vec<Uuid> = sqlx::query_scalar(&sql)
		.bind(candidate_id)
		.bind(exclude_id)
		.bind(vec)
		.bind(f64::from(dist_threshold))
		.bind(limit)
		.fetch_all(executor)
		.await?;

	Ok(ids)
}

/// `(id, candidate_id)` for every id in `ids` that exists.
pub async fn entity_owners<'e, E>(
	executor: E,
	kind: EntityKind,
	ids: &[Uuid],
) -> Result<Vec<(Uuid, Uuid)>>
where
	E: Executor<'e, Database = Postgres>,
{
	let table = table(kind);
	let id = id_column(kind);
	let sql = format!("SELECT {id}, candidate_id FROM {table} WHERE {id} = ANY($1)");
	let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(&sql).bind(ids).fetch_all(executor).await?;

	Ok(rows)
}

/// The stored embedding as pgvector text.
pub async fn entity_embedding<'e, E>(
	executor: E,
	kind: EntityKind,
	id: Uuid,
) -> Result<Option<String>>
where
	E: Executor<'e, Database = Postgres>,
{
	let table = table(kind);
	let id_col = id_column(kind);
	let sql = format!("SELECT embedding::text FROM {table} WHERE {id_col} = $1");
	let row: Option<String> = sqlx::query_scalar(&sql).bind(id).fetch_optional(executor).await?;

	Ok(row)
}

/// Returns `false` when the pair was already linked.
pub async fn insert_link<'e, E>(executor: E, promise_id: Uuid, action_id: Uuid) -> Result<bool>
where
	E: Executor<'e, Database = Postgres>,
{
	let res = sqlx::query(
		"\
INSERT INTO promise_action_links (promise_id, action_id)
VALUES ($1, $2)
ON CONFLICT (promise_id, action_id) DO NOTHING",
	)
	.bind(promise_id)
	.bind(action_id)
	.execute(executor)
	.await?;

	Ok(res.rows_affected() > 0)
}

pub async fn insert_citation<'e, E>(executor: E, citation: &NewCitation<'_>) -> Result<Citation>
where
	E: Executor<'e, Database = Postgres>,
{
	let row = sqlx::query_as::<_, Citation>(
		"\
INSERT INTO citations (citation_id, date, extract, url, promise_id, action_id)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING citation_id, date, extract, url, promise_id, action_id",
	)
	.bind(citation.citation_id)
	.bind(citation.date)
	.bind(citation.extract)
	.bind(citation.url)
	.bind(citation.parent.promise_id())
	.bind(citation.parent.action_id())
	.fetch_one(executor)
	.await?;

	Ok(row)
}

pub async fn list_citations<'e, E>(executor: E, parent: CitationParent) -> Result<Vec<Citation>>
where
	E: Executor<'e, Database = Postgres>,
{
	let id = id_column(parent.kind());
	let sql = format!(
		"\
SELECT citation_id, date, extract, url, promise_id, action_id
FROM citations
WHERE {id} = $1
ORDER BY date ASC, citation_id ASC"
	);
	let rows = sqlx::query_as::<_, Citation>(&sql).bind(parent.id()).fetch_all(executor).await?;

	Ok(rows)
}
