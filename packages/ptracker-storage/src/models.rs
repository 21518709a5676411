use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_domain::EntityKind;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Candidate {
	pub candidate_id: Uuid,
	pub name: String,
	pub description: String,
	pub profile_image_url: Option<String>,
	pub created_at: OffsetDateTime,
	pub promise_count: i64,
	pub action_count: i64,
}

#[derive(Debug)]
pub struct NewCandidate<'a> {
	pub candidate_id: Uuid,
	pub name: &'a str,
	pub description: &'a str,
	pub profile_image_url: Option<&'a str>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Promise {
	pub promise_id: Uuid,
	pub candidate_id: Uuid,
	pub text: String,
	pub status: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub citation_count: i64,
	pub action_count: i64,
}

/// Insert arguments. `embedding` is a pgvector text literal.
#[derive(Debug)]
pub struct NewPromise<'a> {
	pub promise_id: Uuid,
	pub candidate_id: Uuid,
	pub text: &'a str,
	pub status: &'a str,
	pub embedding: &'a str,
	pub now: OffsetDateTime,
}

#[derive(Debug)]
pub struct PromiseUpdate<'a> {
	pub promise_id: Uuid,
	pub text: &'a str,
	pub status: &'a str,
	/// `None` keeps the stored embedding.
	pub embedding: Option<&'a str>,
	pub now: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Action {
	pub action_id: Uuid,
	pub candidate_id: Uuid,
	pub text: String,
	pub date: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub citation_count: i64,
	pub promise_count: i64,
}

#[derive(Debug)]
pub struct NewAction<'a> {
	pub action_id: Uuid,
	pub candidate_id: Uuid,
	pub text: &'a str,
	pub date: OffsetDateTime,
	pub embedding: &'a str,
	pub now: OffsetDateTime,
}

#[derive(Debug)]
pub struct ActionUpdate<'a> {
	pub action_id: Uuid,
	pub text: &'a str,
	pub date: OffsetDateTime,
	pub embedding: Option<&'a str>,
	pub now: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Citation {
	pub citation_id: Uuid,
	pub date: OffsetDateTime,
	pub extract: String,
	pub url: String,
	pub promise_id: Option<Uuid>,
	pub action_id: Option<Uuid>,
}

/// The single owner of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationParent {
	Promise(Uuid),
	Action(Uuid),
}
impl CitationParent {
	pub fn new(kind: EntityKind, id: Uuid) -> Self {
		match kind {
			EntityKind::Promise => Self::Promise(id),
			EntityKind::Action => Self::Action(id),
		}
	}

	pub fn kind(self) -> EntityKind {
		match self {
			Self::Promise(_) => EntityKind::Promise,
			Self::Action(_) => EntityKind::Action,
		}
	}

	pub fn id(self) -> Uuid {
		match self {
			Self::Promise(id) | Self::Action(id) => id,
		}
	}

	pub fn promise_id(self) -> Option<Uuid> {
		match self {
			Self::Promise(id) => Some(id),
			Self::Action(_) => None,
		}
	}

	pub fn action_id(self) -> Option<Uuid> {
		match self {
			Self::Promise(_) => None,
			Self::Action(id) => Some(id),
		}
	}
}

#[derive(Debug)]
pub struct NewCitation<'a> {
	pub citation_id: Uuid,
	pub parent: CitationParent,
	pub date: OffsetDateTime,
	pub extract: &'a str,
	pub url: &'a str,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisJob {
	pub job_id: Uuid,
	pub candidate_id: Uuid,
	pub urls: Value,
	pub status: String,
	pub last_error: Option<String>,
	pub report: Option<Value>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
