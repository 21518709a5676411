use std::sync::Arc;

use uuid::Uuid;

use ptracker_domain::PromiseStatus;
use ptracker_service::{
	CreateActionRequest, CreatePromiseRequest, Error, PtrackerService, UpdateActionRequest,
	UpdatePromiseRequest,
};

use crate::support::{
	self, CANDIDATE_NAME, HOUSING_QUOTE, HOUSING_TEXT, ScriptedExtractor, StaticFetcher,
	TableEmbedding,
};

const GROUNDBREAKING_TEXT: &str = "Broke ground on 500 housing units";
const GROUNDBREAKING_QUOTE: &str = "Today we broke ground on the first of 500 housing units.";

// Cosine distance between the two texts is about 0.1, inside the 0.5 link threshold.
fn linking_embedding() -> Arc<TableEmbedding> {
	Arc::new(TableEmbedding::new(&[
		(HOUSING_TEXT, &[1.0, 0.0, 0.0, 0.0]),
		(GROUNDBREAKING_TEXT, &[0.9, 0.435_89, 0.0, 0.0]),
	]))
}

const CLINIC_TEXT: &str = "Open a clinic in every district";
const CLINIC_ACTION_TEXT: &str = "Opened the Riverside district clinic";

// Housing and clinic texts sit on orthogonal axes, so only same-topic pairs link.
fn topic_embedding() -> Arc<TableEmbedding> {
	Arc::new(TableEmbedding::new(&[
		(HOUSING_TEXT, &[1.0, 0.0, 0.0, 0.0]),
		(GROUNDBREAKING_TEXT, &[0.9, 0.435_89, 0.0, 0.0]),
		(CLINIC_TEXT, &[0.0, 0.0, 1.0, 0.0]),
		(CLINIC_ACTION_TEXT, &[0.0, 0.0, 0.9, 0.435_89]),
	]))
}

fn idle_extractor() -> Arc<ScriptedExtractor> {
	Arc::new(ScriptedExtractor::new(|_, _| Ok(support::no_actions())))
}

async fn create_action(service: &PtrackerService, candidate_id: Uuid) -> Uuid {
	service
		.create_action(
			candidate_id,
			CreateActionRequest {
				text: GROUNDBREAKING_TEXT.to_string(),
				date: None,
				citations: vec![super::citation(GROUNDBREAKING_QUOTE)],
				promises: Vec::new(),
			},
		)
		.await
		.expect("Failed to create action.")
		.action_id
}

fn housing_promise(actions: Vec<Uuid>) -> CreatePromiseRequest {
	CreatePromiseRequest {
		text: HOUSING_TEXT.to_string(),
		status: None,
		citations: vec![super::citation(HOUSING_QUOTE)],
		actions,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn auto_links_are_created_once() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping auto_links_are_created_once; set PTRACKER_PG_DSN to run this test.");

		return;
	};
	let providers =
		support::providers(linking_embedding(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let action_id = create_action(&service, candidate_id).await;
	let promise = service
		.create_promise(candidate_id, housing_promise(Vec::new()))
		.await
		.expect("Failed to create promise.");

	assert_eq!(promise.action_count, 1);

	let updated = service
		.update_promise(
			candidate_id,
			promise.promise_id,
			UpdatePromiseRequest { text: None, status: Some(PromiseStatus::Complete) },
		)
		.await
		.expect("Failed to update promise.");

	assert_eq!(updated.status, PromiseStatus::Complete);
	assert_eq!(updated.action_count, 1);

	let linked = service
		.list_promise_actions(candidate_id, promise.promise_id)
		.await
		.expect("Failed to list linked actions.");

	assert_eq!(linked.len(), 1);
	assert_eq!(linked[0].action_id, action_id);

	let action = service.get_action(candidate_id, action_id).await.expect("Failed to get action.");

	assert_eq!(action.promise_count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn explicit_link_to_unknown_action_is_rejected() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping explicit_link_to_unknown_action_is_rejected; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers =
		support::providers(linking_embedding(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let unknown = Uuid::new_v4();
	let err = service
		.create_promise(candidate_id, housing_promise(vec![unknown]))
		.await
		.expect_err("Expected a link mismatch.");

	match err {
		Error::LinkMismatch { ids, .. } => assert_eq!(ids, vec![unknown]),
		other => panic!("Unexpected error: {other:?}"),
	}

	let promises = service
		.list_promises(candidate_id, Default::default())
		.await
		.expect("Failed to list promises.");

	assert!(promises.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn explicit_link_to_another_candidates_action_is_rejected() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping explicit_link_to_another_candidates_action_is_rejected; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers =
		support::providers(linking_embedding(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let jane = super::create_candidate(&service, CANDIDATE_NAME).await;
	let john = super::create_candidate(&service, "John Roe").await;
	let johns_action = create_action(&service, john).await;
	let err = service
		.create_promise(jane, housing_promise(vec![johns_action]))
		.await
		.expect_err("Expected a link mismatch.");

	match err {
		Error::LinkMismatch { ids, .. } => assert_eq!(ids, vec![johns_action]),
		other => panic!("Unexpected error: {other:?}"),
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn differing_dimensions_link_through_a_second_embedding() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping differing_dimensions_link_through_a_second_embedding; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let embedding = linking_embedding();
	let providers =
		support::providers(embedding.clone(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 3);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;

	create_action(&service, candidate_id).await;
	embedding.requested_dims.lock().expect("lock poisoned").clear();

	let promise = service
		.create_promise(candidate_id, housing_promise(Vec::new()))
		.await
		.expect("Failed to create promise.");

	assert_eq!(promise.action_count, 1);
	assert_eq!(*embedding.requested_dims.lock().expect("lock poisoned"), vec![4, 3]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn promise_text_change_adds_links_and_keeps_old_ones() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping promise_text_change_adds_links_and_keeps_old_ones; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers =
		support::providers(topic_embedding(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let housing_action = create_action(&service, candidate_id).await;
	let promise = service
		.create_promise(candidate_id, housing_promise(Vec::new()))
		.await
		.expect("Failed to create promise.");
	let clinic_action = service
		.create_action(
			candidate_id,
			CreateActionRequest {
				text: CLINIC_ACTION_TEXT.to_string(),
				date: None,
				citations: vec![super::citation("The Riverside district clinic opened today.")],
				promises: Vec::new(),
			},
		)
		.await
		.expect("Failed to create action.")
		.action_id;

	assert_eq!(promise.action_count, 1);

	let updated = service
		.update_promise(
			candidate_id,
			promise.promise_id,
			UpdatePromiseRequest { text: Some(CLINIC_TEXT.to_string()), status: None },
		)
		.await
		.expect("Failed to update promise.");

	assert_eq!(updated.text, CLINIC_TEXT);
	assert_eq!(updated.action_count, 2);

	let mut linked: Vec<Uuid> = service
		.list_promise_actions(candidate_id, promise.promise_id)
		.await
		.expect("Failed to list linked actions.")
		.into_iter()
		.map(|action| action.action_id)
		.collect();
	let mut expected = vec![housing_action, clinic_action];

	linked.sort();
	expected.sort();

	assert_eq!(linked, expected);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PTRACKER_PG_DSN to run."]
async fn action_text_change_adds_links_and_keeps_old_ones() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping action_text_change_adds_links_and_keeps_old_ones; set PTRACKER_PG_DSN to run this test."
		);

		return;
	};
	let providers =
		support::providers(topic_embedding(), idle_extractor(), StaticFetcher::new(&[]));
	let cfg = support::test_config(test_db.dsn().to_string(), 4, 4);
	let service = super::build_service(cfg, providers).await.expect("Failed to build service.");
	let candidate_id = super::create_candidate(&service, CANDIDATE_NAME).await;
	let housing_promise_id = service
		.create_promise(candidate_id, housing_promise(Vec::new()))
		.await
		.expect("Failed to create promise.")
		.promise_id;
	let clinic_promise_id = service
		.create_promise(
			candidate_id,
			CreatePromiseRequest {
				text: CLINIC_TEXT.to_string(),
				status: None,
				citations: vec![super::citation("We will open a clinic in every district.")],
				actions: Vec::new(),
			},
		)
		.await
		.expect("Failed to create promise.")
		.promise_id;
	let action_id = create_action(&service, candidate_id).await;
	let action = service.get_action(candidate_id, action_id).await.expect("Failed to get action.");

	assert_eq!(action.promise_count, 1);

	let updated = service
		.update_action(
			candidate_id,
			action_id,
			UpdateActionRequest { text: Some(CLINIC_ACTION_TEXT.to_string()), date: None },
		)
		.await
		.expect("Failed to update action.");

	assert_eq!(updated.text, CLINIC_ACTION_TEXT);
	assert_eq!(updated.promise_count, 2);

	let mut linked: Vec<Uuid> = service
		.list_action_promises(candidate_id, action_id)
		.await
		.expect("Failed to list linked promises.")
		.into_iter()
		.map(|promise| promise.promise_id)
		.collect();
	let mut expected = vec![housing_promise_id, clinic_promise_id];

	linked.sort();
	expected.sort();

	assert_eq!(linked, expected);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
