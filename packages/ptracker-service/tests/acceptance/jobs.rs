use std::sync::Arc;

use time::OffsetDateTime;

use ptracker_domain::EntityKind;
use ptracker_service::{AnalyzeSourcesRequest, SourceAnalyzer};
use ptracker_storage::jobs;

use crate::support::{
	self, CANDIDATE_NAME, HOUSING_QUOTE, HOUSING_TEXT, PROMISE_SCHEMA, SOURCE_URL,
	ScriptedExtractor, StaticFetcher, TableEmbedding,
};

const PAGE: &str = "Jane Doe told reporters: I will build 500 housing units within one year.";

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn queued_analysis_runs_to_done() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping queued_analysis_runs_to_done; set PTRACKER_PG_DSN to run this test.");

		return;
	};
	let extractor = Arc::new(ScriptedExtractor::new(|schema, _| match schema {
		PROMISE_SCHEMA => Ok(support::promise_payload(HOUSING_TEXT, HOUSING_QUOTE)),
		_ => Ok(support::no_actions()),
	}));
	let providers = support::providers(
		Arc::new(TableEmbedding::new(&[(HOUSING_TEXT, &[1.0, 0.0, 0.0, 0.0])])),
		extractor,
		StaticFetcher::new(&[(SOURCE_URL, PAGE)]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let started = service
		.analyze_sources_request(
			candidate_id,
			AnalyzeSourcesRequest { urls: vec![SOURCE_URL.to_string()] },
		)
		.await
		.expect("Failed to queue analysis.");

	assert_eq!(started.status, "started");
	assert_eq!(
		service.get_job(started.job_id).await.expect("Failed to get job.").status,
		jobs::STATUS_PENDING
	);

	let job = jobs::claim_next_job(&service.db, OffsetDateTime::now_utc())
		.await
		.expect("Failed to claim job.")
		.expect("Expected a pending job.");

	assert_eq!(job.job_id, started.job_id);
	assert!(
		jobs::claim_next_job(&service.db, OffsetDateTime::now_utc())
			.await
			.expect("Failed to claim job.")
			.is_none()
	);

	let report = service
		.run_analysis_job(&SourceAnalyzer::default(), &job)
		.await
		.expect("Analysis failed.");
	let report_json = serde_json::to_value(&report).expect("Failed to encode report.");

	jobs::mark_job_done(&service.db.pool, job.job_id, &report_json, OffsetDateTime::now_utc())
		.await
		.expect("Failed to mark job done.");

	let done = service.get_job(started.job_id).await.expect("Failed to get job.");

	assert_eq!(done.status, jobs::STATUS_DONE);
	assert_eq!(done.urls, vec![SOURCE_URL.to_string()]);
	assert_eq!(
		done.report.and_then(|r| r.kind(EntityKind::Promise).map(|k| k.persisted)),
		Some(1)
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
