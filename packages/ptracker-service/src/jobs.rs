use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use ptracker_storage::{candidates, jobs, models::AnalysisJob};

use crate::{AnalysisReport, CandidateRef, Error, PtrackerService, Result, SourceAnalyzer};

pub const STATUS_STARTED: &str = "started";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzeSourcesRequest {
	pub urls: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzeSourcesResponse {
	pub status: String,
	pub job_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobResponse {
	pub job_id: Uuid,
	pub candidate_id: Uuid,
	pub status: String,
	pub urls: Vec<String>,
	pub last_error: Option<String>,
	pub report: Option<AnalysisReport>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl TryFrom<AnalysisJob> for JobResponse {
	type Error = Error;

	fn try_from(row: AnalysisJob) -> Result<Self> {
		let urls = job_urls(&row)?;
		let report = row
			.report
			.map(serde_json::from_value::<AnalysisReport>)
			.transpose()
			.map_err(|err| Error::Storage {
				message: format!("Job {} has an unreadable report: {err}.", row.job_id),
			})?;

		Ok(Self {
			job_id: row.job_id,
			candidate_id: row.candidate_id,
			status: row.status,
			urls,
			last_error: row.last_error,
			report,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

impl PtrackerService {
	/// Queues an analysis run and returns without waiting for it.
	pub async fn analyze_sources_request(
		&self,
		candidate_id: Uuid,
		req: AnalyzeSourcesRequest,
	) -> Result<AnalyzeSourcesResponse> {
		let urls = validate_urls(&req.urls)?;

		self.require_candidate(candidate_id).await?;

		let job_id = Uuid::new_v4();

		jobs::enqueue_job(&self.db.pool, job_id, candidate_id, &urls, OffsetDateTime::now_utc())
			.await?;

		tracing::info!(
			candidate_id = %candidate_id,
			job_id = %job_id,
			urls = urls.len(),
			"Queued analysis job."
		);

		Ok(AnalyzeSourcesResponse { status: STATUS_STARTED.to_string(), job_id })
	}

	pub async fn get_job(&self, job_id: Uuid) -> Result<JobResponse> {
		let row = jobs::get_job(&self.db.pool, job_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("Job {job_id} does not exist.") })?;

		row.try_into()
	}

	/// Runs a claimed job's pipeline with a fresh context.
	pub async fn run_analysis_job(
		&self,
		analyzer: &SourceAnalyzer,
		job: &AnalysisJob,
	) -> Result<AnalysisReport> {
		let urls = job_urls(job)?;
		let candidate = candidates::get_candidate(&self.db.pool, job.candidate_id)
			.await?
			.ok_or_else(|| Error::NotFound {
				message: format!("Candidate {} does not exist.", job.candidate_id),
			})?;
		let ctx = self.context();

		analyzer
			.analyze_sources(
				&ctx,
				CandidateRef { candidate_id: candidate.candidate_id, name: &candidate.name },
				&urls,
			)
			.await
	}
}

fn validate_urls(urls: &[String]) -> Result<Vec<String>> {
	if urls.is_empty() {
		return Err(Error::InvalidRequest {
			message: "urls must contain at least one URL.".to_string(),
		});
	}

	urls.iter()
		.map(|url| {
			crate::validate_http_url("urls[]", url)?;

			Ok(url.trim().to_string())
		})
		.collect()
}

fn job_urls(job: &AnalysisJob) -> Result<Vec<String>> {
	serde_json::from_value(job.urls.clone()).map_err(|err| Error::Storage {
		message: format!("Job {} has unreadable urls: {err}.", job.job_id),
	})
}
