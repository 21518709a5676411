use std::sync::Arc;

use uuid::Uuid;

use ptracker_domain::EntityKind;
use ptracker_service::{CandidateRef, Page, PtrackerService, SourceAnalyzer};

use crate::support::{
	self, CANDIDATE_NAME, HOUSING_QUOTE, HOUSING_TEXT, HOUSING_TEXT_LONG, PROMISE_SCHEMA,
	SOURCE_URL, ScriptedExtractor, StaticFetcher, TableEmbedding,
};

const SHORT_URL: &str = "https://news.example.com/rally";
const LONG_URL: &str = "https://news.example.com/interview";
const SHORT_PAGE: &str = "At the rally Jane Doe said: I will build 500 housing units within one year.";
const LONG_PAGE: &str =
	"In an interview Jane Doe said: we will build 500 affordable housing units within one year.";
const LONG_QUOTE: &str = "we will build 500 affordable housing units within one year.";

// The two housing texts sit at cosine distance 0.2, under the 0.3 duplicate threshold.
fn housing_embedding() -> Arc<TableEmbedding> {
	Arc::new(TableEmbedding::new(&[
		(HOUSING_TEXT, &[1.0, 0.0, 0.0, 0.0]),
		(HOUSING_TEXT_LONG, &[0.8, 0.6, 0.0, 0.0]),
	]))
}

fn housing_extractor() -> Arc<ScriptedExtractor> {
	Arc::new(ScriptedExtractor::new(|schema, chunk| {
		if schema != PROMISE_SCHEMA {
			return Ok(support::no_actions());
		}
		if chunk.contains(LONG_QUOTE) {
			return Ok(support::promise_payload(HOUSING_TEXT_LONG, LONG_QUOTE));
		}

		Ok(support::promise_payload(HOUSING_TEXT, HOUSING_QUOTE))
	}))
}

async fn analyze(service: &PtrackerService, candidate_id: Uuid, urls: &[&str]) -> usize {
	let urls: Vec<String> = urls.iter().map(|url| url.to_string()).collect();
	let report = SourceAnalyzer::default()
		.analyze_sources(
			&service.context(),
			CandidateRef { candidate_id, name: CANDIDATE_NAME },
			&urls,
		)
		.await
		.expect("Analysis failed.");

	report.kind(EntityKind::Promise).map(|k| k.persisted).unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn source_with_one_promise_persists_it_with_its_citation() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping source_with_one_promise_persists_it_with_its_citation; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers = support::providers(
		housing_embedding(),
		housing_extractor(),
		StaticFetcher::new(&[(SOURCE_URL, SHORT_PAGE)]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;

	assert_eq!(analyze(&service, candidate_id, &[SOURCE_URL]).await, 1);

	let promises =
		service.list_promises(candidate_id, Page::default()).await.expect("List failed.");

	assert_eq!(promises.len(), 1);
	assert_eq!(promises[0].text, HOUSING_TEXT);
	assert_eq!(promises[0].citation_count, 1);

	let citations = service
		.list_citations(EntityKind::Promise, candidate_id, promises[0].promise_id)
		.await
		.expect("List citations failed.");

	assert_eq!(citations.len(), 1);
	assert_eq!(citations[0].extract, HOUSING_QUOTE);
	assert_eq!(citations[0].url, SOURCE_URL);
	assert_eq!(citations[0].promise_id, Some(promises[0].promise_id));
	assert_eq!(citations[0].action_id, None);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn duplicates_within_one_run_persist_the_longer_text() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping duplicates_within_one_run_persist_the_longer_text; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers = support::providers(
		housing_embedding(),
		housing_extractor(),
		StaticFetcher::new(&[(SHORT_URL, SHORT_PAGE), (LONG_URL, LONG_PAGE)]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;

	assert_eq!(analyze(&service, candidate_id, &[SHORT_URL, LONG_URL]).await, 1);

	let promises =
		service.list_promises(candidate_id, Page::default()).await.expect("List failed.");

	assert_eq!(promises.len(), 1);
	assert_eq!(promises[0].text, HOUSING_TEXT_LONG);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn stored_promise_wins_over_a_longer_draft() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping stored_promise_wins_over_a_longer_draft; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers = support::providers(
		housing_embedding(),
		housing_extractor(),
		StaticFetcher::new(&[(SHORT_URL, SHORT_PAGE), (LONG_URL, LONG_PAGE)]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;

	assert_eq!(analyze(&service, candidate_id, &[SHORT_URL]).await, 1);
	assert_eq!(analyze(&service, candidate_id, &[LONG_URL]).await, 0);

	let promises =
		service.list_promises(candidate_id, Page::default()).await.expect("List failed.");

	assert_eq!(promises.len(), 1);
	assert_eq!(promises[0].text, HOUSING_TEXT);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn matches_are_scoped_to_the_candidate() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping matches_are_scoped_to_the_candidate; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers = support::providers(
		housing_embedding(),
		housing_extractor(),
		StaticFetcher::new(&[(SOURCE_URL, SHORT_PAGE)]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let jane = super::create_candidate(&service, CANDIDATE_NAME).await;
	let john = super::create_candidate(&service, "John Roe").await;

	assert_eq!(analyze(&service, jane, &[SOURCE_URL]).await, 1);
	assert_eq!(analyze(&service, john, &[SOURCE_URL]).await, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
