//! Analysis job runner.
//!
//! Jobs are claimed one at a time. A job that fails is marked FAILED with a sanitized error
//! and is never retried.

use std::time::Duration;

use time::OffsetDateTime;
use tokio::time as tokio_time;

use ptracker_service::{PtrackerService, SourceAnalyzer};
use ptracker_storage::{jobs, models::AnalysisJob};

use crate::Result;

const MAX_JOB_ERROR_CHARS: usize = 1_024;

pub struct WorkerState {
	pub service: PtrackerService,
	pub analyzer: SourceAnalyzer,
	pub poll_interval: Duration,
}

pub async fn run_worker(state: WorkerState) -> color_eyre::Result<()> {
	tracing::info!(poll_interval_ms = state.poll_interval.as_millis() as u64, "Worker started.");

	loop {
		match process_next_job(&state).await {
			Ok(true) => continue,
			Ok(false) => {},
			Err(err) => {
				tracing::error!(error = %err, "Analysis job processing failed.");
			},
		}

		tokio_time::sleep(state.poll_interval).await;
	}
}

/// Claims and runs at most one pending job. Returns whether a job was claimed.
pub async fn process_next_job(state: &WorkerState) -> Result<bool> {
	let Some(job) = jobs::claim_next_job(&state.service.db, OffsetDateTime::now_utc()).await?
	else {
		return Ok(false);
	};

	tracing::info!(
		job_id = %job.job_id,
		candidate_id = %job.candidate_id,
		"Claimed analysis job."
	);

	match state.service.run_analysis_job(&state.analyzer, &job).await {
		Ok(report) => {
			let report_json = serde_json::to_value(&report)?;

			jobs::mark_job_done(
				&state.service.db.pool,
				job.job_id,
				&report_json,
				OffsetDateTime::now_utc(),
			)
			.await?;

			tracing::info!(
				job_id = %job.job_id,
				urls_total = report.urls_total,
				urls_failed = report.urls_failed,
				"Analysis job finished."
			);
		},
		Err(err) => fail_job(state, &job, &err.to_string()).await?,
	}

	Ok(true)
}

async fn fail_job(state: &WorkerState, job: &AnalysisJob, error: &str) -> Result<()> {
	let error_text = sanitize_job_error(error);

	jobs::mark_job_failed(
		&state.service.db.pool,
		job.job_id,
		&error_text,
		OffsetDateTime::now_utc(),
	)
	.await?;

	tracing::error!(job_id = %job.job_id, error = %error_text, "Analysis job failed.");

	Ok(())
}

/// Masks credentials that providers may echo back and caps the length.
pub fn sanitize_job_error(text: &str) -> String {
	let mut parts = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		if redact_next {
			parts.push("[REDACTED]".to_string());

			redact_next = false;

			continue;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
		}

		parts.push(redact_secret_pair(raw).unwrap_or_else(|| raw.to_string()));
	}

	let mut out = parts.join(" ");

	if out.chars().count() > MAX_JOB_ERROR_CHARS {
		out = out.chars().take(MAX_JOB_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

// `api_key=abc` becomes `api_key=[REDACTED]`.
fn redact_secret_pair(word: &str) -> Option<String> {
	let sep = word.find(['=', ':'])?;
	let key = word[..sep].to_ascii_lowercase();

	["api_key", "apikey", "password", "secret", "token"]
		.iter()
		.any(|needle| key.contains(needle))
		.then(|| format!("{}[REDACTED]", &word[..=sep]))
}
