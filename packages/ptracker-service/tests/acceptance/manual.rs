use std::sync::Arc;

use uuid::Uuid;

use ptracker_domain::EntityKind;
use ptracker_service::{CreatePromiseRequest, Error, Page, UpdatePromiseRequest};

use crate::support::{
	self, CANDIDATE_NAME, HOUSING_QUOTE, HOUSING_TEXT, HOUSING_TEXT_LONG, ScriptedExtractor,
	StaticFetcher, TableEmbedding,
};

const PARKS_TEXT: &str = "Plant 10,000 trees in city parks";
const PARKS_QUOTE: &str = "We will plant 10,000 trees in our parks.";

fn manual_embedding() -> Arc<TableEmbedding> {
	Arc::new(TableEmbedding::new(&[
		(HOUSING_TEXT, &[1.0, 0.0, 0.0, 0.0]),
		(HOUSING_TEXT_LONG, &[0.8, 0.6, 0.0, 0.0]),
		(PARKS_TEXT, &[0.0, 0.0, 1.0, 0.0]),
	]))
}

fn request(text: &str, quote: &str) -> CreatePromiseRequest {
	CreatePromiseRequest {
		text: text.to_string(),
		status: None,
		citations: vec![super::citation(quote)],
		actions: Vec::new(),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn near_duplicate_manual_promise_conflicts() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping near_duplicate_manual_promise_conflicts; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers = support::providers(
		manual_embedding(),
		Arc::new(ScriptedExtractor::new(|_, _| Ok(support::no_actions()))),
		StaticFetcher::new(&[]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let first = service
		.create_promise(candidate_id, request(HOUSING_TEXT, HOUSING_QUOTE))
		.await
		.expect("Failed to create promise.");
	let err = service
		.create_promise(candidate_id, request(HOUSING_TEXT_LONG, HOUSING_QUOTE))
		.await
		.expect_err("Expected a conflict.");

	match err {
		Error::Conflict { ids, .. } => assert_eq!(ids, vec![first.promise_id]),
		other => panic!("Unexpected error: {other:?}"),
	}

	let parks = service
		.create_promise(candidate_id, request(PARKS_TEXT, PARKS_QUOTE))
		.await
		.expect("Failed to create unrelated promise.");
	let err = service
		.update_promise(
			candidate_id,
			parks.promise_id,
			UpdatePromiseRequest { text: Some(HOUSING_TEXT_LONG.to_string()), status: None },
		)
		.await
		.expect_err("Expected a conflict on update.");

	assert!(matches!(err, Error::Conflict { .. }), "Unexpected error: {err:?}");

	let promises =
		service.list_promises(candidate_id, Page::default()).await.expect("List failed.");

	assert_eq!(promises.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn citations_accumulate_on_a_promise() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping citations_accumulate_on_a_promise; set PTRACKER_PG_DSN to run this test.");

		return;
	};
	let providers = support::providers(
		manual_embedding(),
		Arc::new(ScriptedExtractor::new(|_, _| Ok(support::no_actions()))),
		StaticFetcher::new(&[]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let promise = service
		.create_promise(candidate_id, request(HOUSING_TEXT, HOUSING_QUOTE))
		.await
		.expect("Failed to create promise.");

	service
		.add_citation(
			EntityKind::Promise,
			candidate_id,
			promise.promise_id,
			super::citation("Doe repeated the pledge on Tuesday."),
		)
		.await
		.expect("Failed to add citation.");

	let citations = service
		.list_citations(EntityKind::Promise, candidate_id, promise.promise_id)
		.await
		.expect("Failed to list citations.");

	assert_eq!(citations.len(), 2);

	let err = service
		.add_citation(
			EntityKind::Action,
			candidate_id,
			promise.promise_id,
			super::citation("Wrong parent kind."),
		)
		.await
		.expect_err("Expected a missing parent.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn unknown_candidate_is_not_found() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping unknown_candidate_is_not_found; set PTRACKER_PG_DSN to run this test.");

		return;
	};
	let providers = support::providers(
		manual_embedding(),
		Arc::new(ScriptedExtractor::new(|_, _| Ok(support::no_actions()))),
		StaticFetcher::new(&[]),
	);
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let err = service
		.create_promise(Uuid::new_v4(), request(HOUSING_TEXT, HOUSING_QUOTE))
		.await
		.expect_err("Expected a missing candidate.");

	assert!(matches!(err, Error::NotFound { .. }), "Unexpected error: {err:?}");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
