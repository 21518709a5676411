use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_domain::{EntityKind, links};
use ptracker_storage::{
	actions, entities,
	models::{Action, ActionUpdate, CitationParent, NewAction},
	vector::{parse_pg_vector, vector_to_pg},
};

use crate::{
	CitationInput, Error, Page, PromiseResponse, PtrackerService, Result, citations, dedup,
	embedding, linking,
};

const KIND: EntityKind = EntityKind::Action;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateActionRequest {
	pub text: String,
	/// Defaults to the time of the request.
	#[serde(default, with = "crate::time_serde::option")]
	pub date: Option<OffsetDateTime>,
	pub citations: Vec<CitationInput>,
	/// Promises to link explicitly. Auto-linked promises are added on top.
	#[serde(default)]
	pub promises: Vec<Uuid>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateActionRequest {
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default, with = "crate::time_serde::option")]
	pub date: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionResponse {
	pub action_id: Uuid,
	pub candidate_id: Uuid,
	pub text: String,
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
	pub citation_count: i64,
	pub promise_count: i64,
}
impl From<Action> for ActionResponse {
	fn from(row: Action) -> Self {
		Self {
			action_id: row.action_id,
			candidate_id: row.candidate_id,
			text: row.text,
			date: row.date,
			created_at: row.created_at,
			updated_at: row.updated_at,
			citation_count: row.citation_count,
			promise_count: row.promise_count,
		}
	}
}

impl PtrackerService {
	pub async fn create_action(
		&self,
		candidate_id: Uuid,
		req: CreateActionRequest,
	) -> Result<ActionResponse> {
		let now = OffsetDateTime::now_utc();
		let text = crate::require_non_empty("text", &req.text)?;
		let citations = citations::validate_citations(KIND, &req.citations, now)?;

		self.require_candidate(candidate_id).await?;

		let embedding = embedding::embed_for_kind(&self.cfg, &self.providers, KIND, text).await?;
		let link_vector =
			linking::counterpart_vector(&self.cfg, &self.providers, KIND, text, &embedding).await?;
		let action_id = Uuid::new_v4();
		let mut tx = self.db.pool.begin().await?;
		let conflicts =
			dedup::find_conflicts(&mut tx, &self.cfg, KIND, candidate_id, &embedding, None).await?;

		if !conflicts.is_empty() {
			return Err(Error::Conflict {
				message: "Action duplicates existing actions.".to_string(),
				ids: conflicts,
			});
		}

		linking::validate_explicit_links(&mut tx, KIND.counterpart(), candidate_id, &req.promises)
			.await?;

		let auto =
			linking::auto_link_matches(&mut tx, &self.cfg, KIND, candidate_id, &link_vector).await?;
		let link_ids = links::union_ids(&req.promises, &auto);
		let embedding = vector_to_pg(&embedding);

		actions::insert_action(
			&mut *tx,
			&NewAction {
				action_id,
				candidate_id,
				text,
				date: req.date.unwrap_or(now),
				embedding: &embedding,
				now,
			},
		)
		.await?;

		for citation in &citations {
			entities::insert_citation(&mut *tx, &citation.to_new(CitationParent::Action(action_id)))
				.await?;
		}

		let linked = linking::insert_links(&mut tx, KIND, action_id, &link_ids).await?;

		tx.commit().await?;

		tracing::info!(
			candidate_id = %candidate_id,
			action_id = %action_id,
			linked,
			"Created action."
		);

		self.get_action(candidate_id, action_id).await
	}

	pub async fn update_action(
		&self,
		candidate_id: Uuid,
		action_id: Uuid,
		req: UpdateActionRequest,
	) -> Result<ActionResponse> {
		let existing = self.find_action(candidate_id, action_id).await?;
		let text = match req.text.as_deref() {
			Some(raw) => crate::require_non_empty("text", raw)?.to_string(),
			None => existing.text.clone(),
		};
		let date = req.date.unwrap_or(existing.date);
		let text_changed = text != existing.text;
		let embedding = if text_changed {
			embedding::embed_for_kind(&self.cfg, &self.providers, KIND, &text).await?
		} else {
			let stored =
				entities::entity_embedding(&self.db.pool, KIND, action_id).await?.ok_or_else(
					|| Error::NotFound { message: format!("Action {action_id} does not exist.") },
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
				Some(action_id),
			)
			.await?;

			if !conflicts.is_empty() {
				return Err(Error::Conflict {
					message: "Updated action duplicates existing actions.".to_string(),
					ids: conflicts,
				});
			}
		}

		let new_embedding = text_changed.then(|| vector_to_pg(&embedding));

		actions::update_action(
			&mut *tx,
			&ActionUpdate {
				action_id,
				text: &text,
				date,
				embedding: new_embedding.as_deref(),
				now: OffsetDateTime::now_utc(),
			},
		)
		.await?;

		let auto =
			linking::auto_link_matches(&mut tx, &self.cfg, KIND, candidate_id, &link_vector).await?;
		let linked = linking::insert_links(&mut tx, KIND, action_id, &auto).await?;

		tx.commit().await?;

		tracing::info!(
			candidate_id = %candidate_id,
			action_id = %action_id,
			text_changed,
			linked,
			"Updated action."
		);

		self.get_action(candidate_id, action_id).await
	}

	pub async fn get_action(&self, candidate_id: Uuid, action_id: Uuid) -> Result<ActionResponse> {
		Ok(self.find_action(candidate_id, action_id).await?.into())
	}

	pub async fn list_actions(
		&self,
		candidate_id: Uuid,
		page: Page,
	) -> Result<Vec<ActionResponse>> {
		self.require_candidate(candidate_id).await?;

		let rows =
			actions::list_actions(&self.db.pool, candidate_id, page.offset(), page.limit()).await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	pub async fn list_action_promises(
		&self,
		candidate_id: Uuid,
		action_id: Uuid,
	) -> Result<Vec<PromiseResponse>> {
		self.find_action(candidate_id, action_id).await?;

		let rows = actions::list_action_promises(&self.db.pool, action_id).await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	async fn find_action(&self, candidate_id: Uuid, action_id: Uuid) -> Result<Action> {
		actions::get_action(&self.db.pool, candidate_id, action_id).await?.ok_or_else(|| {
			Error::NotFound {
				message: format!("Action {action_id} does not exist for candidate {candidate_id}."),
			}
		})
	}
}
