use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_domain::EntityKind;
use ptracker_storage::{
	actions, entities,
	models::{Citation, CitationParent, NewCitation},
	promises,
};

use crate::{Error, PtrackerService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CitationInput {
	/// Defaults to the time of the request.
	#[serde(default, with = "crate::time_serde::option")]
	pub date: Option<OffsetDateTime>,
	pub extract: String,
	pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CitationResponse {
	pub citation_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub date: OffsetDateTime,
	pub extract: String,
	pub url: String,
	pub promise_id: Option<Uuid>,
	pub action_id: Option<Uuid>,
}
impl From<Citation> for CitationResponse {
	fn from(row: Citation) -> Self {
		Self {
			citation_id: row.citation_id,
			date: row.date,
			extract: row.extract,
			url: row.url,
			promise_id: row.promise_id,
			action_id: row.action_id,
		}
	}
}

/// Checked citation fields, ready to insert.
#[derive(Debug)]
pub(crate) struct ValidCitation {
	pub(crate) date: OffsetDateTime,
	pub(crate) extract: String,
	pub(crate) url: String,
}
impl ValidCitation {
	pub(crate) fn to_new(&self, parent: CitationParent) -> NewCitation<'_> {
		NewCitation {
			citation_id: Uuid::new_v4(),
			parent,
			date: self.date,
			extract: &self.extract,
			url: &self.url,
		}
	}
}

pub(crate) fn validate_citations(
	kind: EntityKind,
	inputs: &[CitationInput],
	now: OffsetDateTime,
) -> Result<Vec<ValidCitation>> {
	if inputs.is_empty() {
		return Err(Error::InvariantViolation {
			message: format!("A {kind} requires at least one citation."),
		});
	}

	inputs.iter().map(|input| validate_citation(input, now)).collect()
}

pub(crate) fn validate_citation(
	input: &CitationInput,
	now: OffsetDateTime,
) -> Result<ValidCitation> {
	let extract = crate::require_non_empty("citation extract", &input.extract)?;

	crate::validate_http_url("citation url", &input.url)?;

	Ok(ValidCitation {
		date: input.date.unwrap_or(now),
		extract: extract.to_string(),
		url: input.url.trim().to_string(),
	})
}

impl PtrackerService {
	pub async fn add_citation(
		&self,
		kind: EntityKind,
		candidate_id: Uuid,
		parent_id: Uuid,
		input: CitationInput,
	) -> Result<CitationResponse> {
		let citation = validate_citation(&input, OffsetDateTime::now_utc())?;

		self.require_parent(kind, candidate_id, parent_id).await?;

		let row = entities::insert_citation(
			&self.db.pool,
			&citation.to_new(CitationParent::new(kind, parent_id)),
		)
		.await?;

		Ok(row.into())
	}

	pub async fn list_citations(
		&self,
		kind: EntityKind,
		candidate_id: Uuid,
		parent_id: Uuid,
	) -> Result<Vec<CitationResponse>> {
		self.require_parent(kind, candidate_id, parent_id).await?;

		let rows =
			entities::list_citations(&self.db.pool, CitationParent::new(kind, parent_id)).await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	async fn require_parent(
		&self,
		kind: EntityKind,
		candidate_id: Uuid,
		parent_id: Uuid,
	) -> Result<()> {
		let exists = match kind {
			EntityKind::Promise =>
				promises::get_promise(&self.db.pool, candidate_id, parent_id).await?.is_some(),
			EntityKind::Action =>
				actions::get_action(&self.db.pool, candidate_id, parent_id).await?.is_some(),
		};

		if !exists {
			return Err(Error::NotFound {
				message: format!("{kind} {parent_id} does not exist for candidate {candidate_id}."),
			});
		}

		Ok(())
	}
}
