use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_storage::{candidates, models::{Candidate, NewCandidate}};

use crate::{Error, Page, PtrackerService, Result};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 128;
const DESCRIPTION_MAX_CHARS: usize = 500;
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".svg"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateCandidateRequest {
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub profile_image_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateResponse {
	pub candidate_id: Uuid,
	pub name: String,
	pub description: String,
	pub profile_image_url: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	pub promise_count: i64,
	pub action_count: i64,
}
impl From<Candidate> for CandidateResponse {
	fn from(row: Candidate) -> Self {
		Self {
			candidate_id: row.candidate_id,
			name: row.name,
			description: row.description,
			profile_image_url: row.profile_image_url,
			created_at: row.created_at,
			promise_count: row.promise_count,
			action_count: row.action_count,
		}
	}
}

impl PtrackerService {
	pub async fn create_candidate(&self, req: CreateCandidateRequest) -> Result<CandidateResponse> {
		validate_create_candidate(&req)?;

		let candidate_id = Uuid::new_v4();
		let profile_image_url =
			req.profile_image_url.as_deref().map(str::trim).filter(|url| !url.is_empty());

		candidates::insert_candidate(
			&self.db.pool,
			&NewCandidate {
				candidate_id,
				name: req.name.trim(),
				description: req.description.trim(),
				profile_image_url,
				created_at: OffsetDateTime::now_utc(),
			},
		)
		.await?;

		tracing::info!(candidate_id = %candidate_id, "Created candidate.");

		self.get_candidate(candidate_id).await
	}

	pub async fn get_candidate(&self, candidate_id: Uuid) -> Result<CandidateResponse> {
		let row = candidates::get_candidate(&self.db.pool, candidate_id).await?.ok_or_else(|| {
			Error::NotFound { message: format!("Candidate {candidate_id} does not exist.") }
		})?;

		Ok(row.into())
	}

	pub async fn list_candidates(&self, page: Page) -> Result<Vec<CandidateResponse>> {
		let rows = candidates::list_candidates(&self.db.pool, page.offset(), page.limit()).await?;

		Ok(rows.into_iter().map(Into::into).collect())
	}

	pub(crate) async fn require_candidate(&self, candidate_id: Uuid) -> Result<()> {
		if !candidates::candidate_exists(&self.db.pool, candidate_id).await? {
			return Err(Error::NotFound {
				message: format!("Candidate {candidate_id} does not exist."),
			});
		}

		Ok(())
	}
}

fn validate_create_candidate(req: &CreateCandidateRequest) -> Result<()> {
	let name_chars = req.name.trim().chars().count();

	if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars) {
		return Err(Error::InvalidRequest {
			message: format!(
				"name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters."
			),
		});
	}
	if req.description.trim().chars().count() > DESCRIPTION_MAX_CHARS {
		return Err(Error::InvalidRequest {
			message: format!("description must be at most {DESCRIPTION_MAX_CHARS} characters."),
		});
	}

	if let Some(raw) = req.profile_image_url.as_deref().filter(|url| !url.trim().is_empty()) {
		let parsed = crate::validate_http_url("profile_image_url", raw)?;
		let path = parsed.path().to_ascii_lowercase();

		if !IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
			return Err(Error::InvalidRequest {
				message: "profile_image_url must point to a .jpg, .jpeg, .png or .svg file."
					.to_string(),
			});
		}
	}

	Ok(())
}
