use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_domain::{EntityKind, PromiseStatus, links};
use ptracker_storage::{
	entities,
	models::{CitationParent, NewPromise, Promise, PromiseUpdate},
	promises,
	vector::{parse_pg_vector, vector_to_pg},
};

use crate::{
	ActionResponse, CitationInput, Error, Page, PtrackerService, Result, citations, dedup,
	embedding, linking,
};

const KIND: EntityKind = EntityKind::Promise;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatePromiseRequest {
	pub text: String,
	#[serde(default)]
	pub status: Option<PromiseStatus>,
	pub citations: Vec<CitationInput>,
	/// Actions to link explicitly. Auto-linked actions are added on top.
	#[serde(default)]
	pub actions: Vec<Uuid>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdatePromiseRequest {
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub status: Option<PromiseStatus>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromiseResponse {
	pub promise_id: Uuid,
	pub candidate_id: Uuid,
	pub text: String,
	pub status: PromiseStatus,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
	pub citation_count: i64,
	pub action_count: i64,
}
impl TryFrom<Promise> for PromiseResponse {
	type Error = Error;

	fn try_from(row: Promise) -> Result<Self> {
		let status = row.status.parse::<PromiseStatus>().map_err(|message| Error::Storage {
			message: format!("Promise {} has an unreadable status. {message}", row.promise_id),
		})?;

		Ok(Self {
			promise_id: row.promise_id,
			candidate_id: row.candidate_id,
			text: row.text,
			status,
			created_at: row.created_at,
			updated_at: row.updated_at,
			citation_count: row.citation_count,
			action_count: row.action_count,
		})
	}
}

impl PtrackerService {
	pub async fn create_promise(
		&self,
		candidate_id: Uuid,
		req: CreatePromiseRequest,
	) -> Result<PromiseResponse> {
		let now = OffsetDateTime::now_utc();
		let text = crate::require_non_empty("text", &req.text)?;
		let citations = citations::validate_citations(KIND, &req.citations, now)?;

		self.require_candidate(candidate_id).await?;

		let embedding = embedding::embed_for_kind(&self.cfg, &self.providers, KIND, text).await?;
		let link_vector =
			linking::counterpart_vector(&self.cfg, &self.providers, KIND, text, &embedding).await?;
		let promise_id = Uuid::new_v4();
		let mut tx = self.db.pool.begin().await?;
		let conflicts =
			dedup::find_conflicts(&mut tx, &self.cfg, KIND, candidate_id, &embedding, None).await?;

		if !conflicts.is_empty() {
			return Err(Error::Conflict {
				message: "Promise duplicates existing promises.".to_string(),
				ids: conflicts,
			});
		}

		linking::validate_explicit_links(&mut tx, KIND.counterpart(), candidate_id, &req.actions)
			.await?;

		let auto =
			linking::auto_link_matches(&mut tx, &self.cfg, KIND, candidate_id, &link_vector).await?;
		let link_ids = links::union_ids(&req.actions, &auto);
		let embedding = vector_to_pg(&embedding);

		promises::insert_promise(
			&mut *tx,
			&NewPromise {
				promise_id,
				candidate_id,
				text,
				status: req.status.unwrap_or_default().as_str(),
				embedding: &embedding,
				now,
			},
		)
		.await?;

		for citation in &citations {
			entities::insert_citation(
				&mut *tx,
				&citation.to_new(CitationParent::Promise(promise_id)),
			)
			.await?;
		}

		let linked = linking::insert_links(&mut tx, KIND, promise_id, &link_ids).await?;

		tx.commit().await?;

		tracing::info!(
			candidate_id = %candidate_id,
			promise_id = %promise_id,
			linked,
			"Created promise."
		);

		self.get_promise(candidate_id, promise_id).await
	}

	/// Applies `req`. Links are only ever added: auto-linking runs again and existing links stay.
	pub async fn update_promise(
		&self,
		candidate_id: Uuid,
		promise_id: Uuid,
		req: UpdatePromiseRequest,
	) -> Result<PromiseResponse> {
		let existing = self.find_promise(candidate_id, promise_id).await?;
		let text = match req.text.as_deref() {
			Some(raw) => crate::require_non_empty("text", raw)?.to_string(),
			None => existing.text.clone(),
		};
		let status = match req.status {
			Some(status) => status,
			None => PromiseResponse::try_from(existing.clone())?.status,
		};
		let text_changed = text != existing.text;
		let embedding = if text_changed {
			embedding::embed_for_kind(&self.cfg, &self.providers, KIND, &text).await?
		} else {
			let stored =
				entities::entity_embedding(&self.db.pool, KIND, promise_id).await?.ok_or_else(
					|| Error::NotFound { message: format!("Promise {promise_id} does not exist.") },
				)?;

			parse_pg_vector(&stored)?
		};
		let link_vector =
			linking::counterpart_vector(&self.cfg, &self.providers, KIND, &text, &embedding)
				.await?;
		let mut tx = self.db.pool.begin().await?;

		if text_changed {
			let conflicts = dedup::find_conflicts(
				&mut tx,
				&self.cfg,
				KIND,
				candidate_id,
				&embedding,
				Some(promise_id),
			)
			.await?;

			if !conflicts.is_empty() {
				return Err(Error::Conflict {
					message: "Updated promise duplicates existing promises.".to_string(),
					ids: conflicts,
				});
			}
		}

		let new_embedding = text_changed.then(|| vector_to_pg(&embedding));

		promises::update_promise(
			&mut *tx,
			&PromiseUpdate {
				promise_id,
				text: &text,
				status: status.as_str(),
				embedding: new_embedding.as_deref(),
				now: OffsetDateTime::now_utc(),
			},
		)
		.await?;

		let auto =
			linking::auto_link_matches(&mut tx, &self.cfg, KIND, candidate_id, &link_vector).await?;
		let linked = linking::insert_links(&mut tx, KIND, promise_id, &auto).await?;

		tx.commit().await?;

		tracing::info!(
			candidate_id = %candidate_id,
			promise_id = %promise_id,
			text_changed,
			linked,
			"Updated promise."
		);

		self.get_promise(candidate_id, promise_id).await
	}

	pub async fn get_promise(
		&self,
		candidate_id: Uuid,
		promise_id: Uuid,
	) -> Result<PromiseResponse> {
		self.find_promise(candidate_id, promise_id).await?.try_into()
	}

	pub async fn list_promises(
		&self,
		candidate_id: Uuid,
		page: Page,
	) -> Result<Vec<PromiseResponse>> {
		self.require_candidate(candidate_id).await?;

		let rows =
			promises::list_promises(&self.db.pool, candidate_id, page.offset(), page.limit())
				.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	pub async fn list_promise_actions(
		&self,
		candidate_id: Uuid,
		promise_id: Uuid,
	) -> Result<Vec<ActionResponse>> {
		self.find_promise(candidate_id, promise_id).await?;

		let rows = promises::list_promise_actions(&self.db.pool, promise_id).await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	async fn find_promise(&self, candidate_id: Uuid, promise_id: Uuid) -> Result<Promise> {
		promises::get_promise(&self.db.pool, candidate_id, promise_id).await?.ok_or_else(|| {
			Error::NotFound {
				message: format!("Promise {promise_id} does not exist for candidate {candidate_id}."),
			}
		})
	}
}
