//! Per-kind claim extraction and persistence.
//!
//! Each extractor owns the same capability set: turn a chunk into validated drafts, collapse
//! duplicates, and write the survivors with their citations and links in one transaction.

use serde::Deserialize;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_domain::{EntityKind, PromiseStatus, clustering::Clusterable, evidence};
use ptracker_providers::extractor::json_schema_format;
use ptracker_storage::{
	actions, entities,
	models::{CitationParent, NewAction, NewCitation, NewPromise},
	promises,
	vector::vector_to_pg,
};

use crate::{AnalysisContext, BoxFuture, Error, Result, dedup, embedding, linking, prompts};

/// Evidence captured at extraction time.
#[derive(Clone, Debug)]
pub struct DraftCitation {
	pub date: OffsetDateTime,
	pub extract: String,
	pub url: String,
}

/// A validated, embedded claim that has not been written yet.
#[derive(Clone, Debug)]
pub struct DraftEntity {
	pub kind: EntityKind,
	pub text: String,
	pub embedding: Vec<f32>,
	/// `embedding` at the counterpart kind's width. Equal to `embedding` when both kinds share
	/// a width.
	pub link_embedding: Vec<f32>,
	pub captured_at: OffsetDateTime,
	pub citations: Vec<DraftCitation>,
}
impl Clusterable for DraftEntity {
	fn embedding(&self) -> &[f32] {
		&self.embedding
	}

	fn text(&self) -> &str {
		&self.text
	}
}

pub trait EntityExtractor
where
	Self: Send + Sync,
{
	fn kind(&self) -> EntityKind;

	/// Drafts found in `chunk`. Provider failures surface as [`Error::Extraction`]; quotes that
	/// are not verbatim in the chunk are dropped without an error.
	fn extract<'a>(
		&'a self,
		ctx: &'a AnalysisContext<'a>,
		chunk: &'a str,
		candidate_name: &'a str,
		source_url: &'a str,
	) -> BoxFuture<'a, Result<Vec<DraftEntity>>>;

	fn deduplicate<'a>(
		&'a self,
		ctx: &'a AnalysisContext<'a>,
		candidate_id: Uuid,
		drafts: Vec<DraftEntity>,
	) -> BoxFuture<'a, Result<Vec<DraftEntity>>> {
		Box::pin(dedup::deduplicate(ctx, self.kind(), candidate_id, drafts))
	}

	/// Writes `drafts` and returns the new ids in draft order.
	fn persist<'a>(
		&'a self,
		ctx: &'a AnalysisContext<'a>,
		candidate_id: Uuid,
		drafts: Vec<DraftEntity>,
	) -> BoxFuture<'a, Result<Vec<Uuid>>> {
		Box::pin(persist_drafts(ctx, self.kind(), candidate_id, drafts))
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PromiseExtractor;
impl EntityExtractor for PromiseExtractor {
	fn kind(&self) -> EntityKind {
		EntityKind::Promise
	}

	fn extract<'a>(
		&'a self,
		ctx: &'a AnalysisContext<'a>,
		chunk: &'a str,
		candidate_name: &'a str,
		source_url: &'a str,
	) -> BoxFuture<'a, Result<Vec<DraftEntity>>> {
		Box::pin(async move {
			let raw = request_completion(
				ctx,
				prompts::PROMISE_SYSTEM,
				"promise_extraction",
				prompts::promise_schema(),
				chunk,
				candidate_name,
			)
			.await?;
			let parsed: PromiseExtraction = parse_completion(EntityKind::Promise, raw)?;

			if !parsed.is_promise {
				tracing::debug!(url = source_url, "Chunk holds no promise.");

				return Ok(Vec::new());
			}

			let Some(draft) = build_draft(
				ctx,
				EntityKind::Promise,
				&parsed.promise_text,
				&parsed.exact_quote,
				chunk,
				source_url,
			)
			.await?
			else {
				return Ok(Vec::new());
			};

			Ok(vec![draft])
		})
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ActionExtractor;
impl EntityExtractor for ActionExtractor {
	fn kind(&self) -> EntityKind {
		EntityKind::Action
	}

	fn extract<'a>(
		&'a self,
		ctx: &'a AnalysisContext<'a>,
		chunk: &'a str,
		candidate_name: &'a str,
		source_url: &'a str,
	) -> BoxFuture<'a, Result<Vec<DraftEntity>>> {
		Box::pin(async move {
			let raw = request_completion(
				ctx,
				prompts::ACTION_SYSTEM,
				"action_extraction",
				prompts::action_schema(),
				chunk,
				candidate_name,
			)
			.await?;
			let parsed: ActionExtraction = parse_completion(EntityKind::Action, raw)?;
			let mut drafts = Vec::with_capacity(parsed.actions.len());

			for item in parsed.actions {
				if let Some(draft) = build_draft(
					ctx,
					EntityKind::Action,
					&item.text,
					&item.verbatim_quote,
					chunk,
					source_url,
				)
				.await?
				{
					drafts.push(draft);
				}
			}

			Ok(drafts)
		})
	}
}

#[derive(Debug, Deserialize)]
struct PromiseExtraction {
	#[serde(default)]
	is_promise: bool,
	#[serde(default)]
	promise_text: String,
	#[serde(default)]
	exact_quote: String,
}

#[derive(Debug, Deserialize)]
struct ActionExtraction {
	#[serde(default)]
	actions: Vec<ExtractedAction>,
}

#[derive(Debug, Deserialize)]
struct ExtractedAction {
	text: String,
	verbatim_quote: String,
}

async fn request_completion(
	ctx: &AnalysisContext<'_>,
	template: &str,
	schema_name: &str,
	schema: Value,
	chunk: &str,
	candidate_name: &str,
) -> Result<Value> {
	let messages = vec![
		serde_json::json!({
			"role": "system",
			"content": prompts::render(template, candidate_name),
		}),
		serde_json::json!({
			"role": "user",
			"content": chunk,
		}),
	];
	let response_format = json_schema_format(schema_name, schema);

	ctx.providers
		.extractor
		.extract(&ctx.cfg.providers.llm_extractor, &messages, &response_format)
		.await
		.map_err(|err| Error::Extraction { message: err.to_string() })
}

fn parse_completion<T>(kind: EntityKind, raw: Value) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	serde_json::from_value(raw).map_err(|err| Error::Extraction {
		message: format!("Completion does not match the {kind} schema: {err}."),
	})
}

// `None` when the quote fails the verbatim guard or the claim text is blank.
async fn build_draft(
	ctx: &AnalysisContext<'_>,
	kind: EntityKind,
	text: &str,
	quote: &str,
	chunk: &str,
	source_url: &str,
) -> Result<Option<DraftEntity>> {
	if !evidence::quote_is_verbatim(chunk, quote) {
		tracing::info!(kind = %kind, url = source_url, "Dropped draft with a non-verbatim quote.");

		return Ok(None);
	}

	let text = text.trim();

	if text.is_empty() {
		tracing::info!(kind = %kind, url = source_url, "Dropped draft with blank claim text.");

		return Ok(None);
	}

	let embedding = embedding::embed_for_kind(ctx.cfg, ctx.providers, kind, text)
		.await
		.map_err(|err| Error::Extraction { message: err.to_string() })?;
	let link_embedding =
		linking::counterpart_vector(ctx.cfg, ctx.providers, kind, text, &embedding)
			.await
			.map_err(|err| Error::Extraction { message: err.to_string() })?;
	let captured_at = OffsetDateTime::now_utc();

	Ok(Some(DraftEntity {
		kind,
		text: text.to_string(),
		embedding,
		link_embedding,
		captured_at,
		citations: vec![DraftCitation {
			date: captured_at,
			extract: quote.to_string(),
			url: source_url.to_string(),
		}],
	}))
}

async fn persist_drafts(
	ctx: &AnalysisContext<'_>,
	kind: EntityKind,
	candidate_id: Uuid,
	drafts: Vec<DraftEntity>,
) -> Result<Vec<Uuid>> {
	if drafts.is_empty() {
		return Ok(Vec::new());
	}
	if let Some(draft) = drafts.iter().find(|draft| draft.citations.is_empty()) {
		return Err(Error::InvariantViolation {
			message: format!("{kind} {:?} has no citations.", draft.text),
		});
	}

	let now = OffsetDateTime::now_utc();
	let mut tx = ctx.db.pool.begin().await?;
	let mut ids = Vec::with_capacity(drafts.len());

	for draft in &drafts {
		let entity_id = Uuid::new_v4();

		insert_draft(&mut tx, candidate_id, entity_id, draft, now).await?;

		for citation in &draft.citations {
			entities::insert_citation(
				&mut *tx,
				&NewCitation {
					citation_id: Uuid::new_v4(),
					parent: CitationParent::new(kind, entity_id),
					date: citation.date,
					extract: &citation.extract,
					url: &citation.url,
				},
			)
			.await?;
		}

		let matched =
			linking::auto_link_matches(&mut tx, ctx.cfg, kind, candidate_id, &draft.link_embedding)
				.await?;
		let linked = linking::insert_links(&mut tx, kind, entity_id, &matched).await?;

		tracing::info!(
			kind = %kind,
			candidate_id = %candidate_id,
			entity_id = %entity_id,
			linked,
			"Persisted extracted claim."
		);

		ids.push(entity_id);
	}

	tx.commit().await?;

	Ok(ids)
}

async fn insert_draft(
	tx: &mut Transaction<'_, Postgres>,
	candidate_id: Uuid,
	entity_id: Uuid,
	draft: &DraftEntity,
	now: OffsetDateTime,
) -> Result<()> {
	let embedding = vector_to_pg(&draft.embedding);

	match draft.kind {
		EntityKind::Promise =>
			promises::insert_promise(
				&mut **tx,
				&NewPromise {
					promise_id: entity_id,
					candidate_id,
					text: &draft.text,
					status: PromiseStatus::default().as_str(),
					embedding: &embedding,
					now,
				},
			)
			.await?,
		EntityKind::Action =>
			actions::insert_action(
				&mut **tx,
				&NewAction {
					action_id: entity_id,
					candidate_id,
					text: &draft.text,
					date: draft.captured_at,
					embedding: &embedding,
					now,
				},
			)
			.await?,
	}

	Ok(())
}
