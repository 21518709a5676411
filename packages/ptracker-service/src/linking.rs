//! Promise/action cross-linking by embedding proximity.

use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

use ptracker_config::Config;
use ptracker_domain::{EntityKind, links};
use ptracker_storage::{entities, vector::vector_to_pg};

use crate::{Error, Providers, Result, embedding};

/// The vector to compare against `kind`'s counterpart rows.
///
/// Vectors of different widths are not comparable, so when the two kinds use different
/// dimensions the text is embedded again at the counterpart's width.
pub(crate) async fn counterpart_vector(
	cfg: &Config,
	providers: &Providers,
	kind: EntityKind,
	text: &str,
	own: &[f32],
) -> Result<Vec<f32>> {
	let counterpart = kind.counterpart();

	if embedding::dimensions_for(cfg, kind) == embedding::dimensions_for(cfg, counterpart) {
		return Ok(own.to_vec());
	}

	embedding::embed_for_kind(cfg, providers, counterpart, text).await
}

/// Counterpart ids of the same candidate within the promise-action distance.
pub(crate) async fn auto_link_matches(
	conn: &mut PgConnection,
	cfg: &Config,
	kind: EntityKind,
	candidate_id: Uuid,
	counterpart_vector: &[f32],
) -> Result<Vec<Uuid>> {
	let vec = vector_to_pg(counterpart_vector);
	let ids = entities::find_within_distance(
		conn,
		kind.counterpart(),
		candidate_id,
		&vec,
		cfg.pipeline.promise_action_dist_threshold,
		None,
		None,
	)
	.await?;

	Ok(ids)
}

/// Fails with [`Error::LinkMismatch`] unless every id exists and belongs to `candidate_id`.
///
/// Missing ids are reported first. Only when all ids exist are foreign ids reported.
pub(crate) async fn validate_explicit_links(
	conn: &mut PgConnection,
	counterpart: EntityKind,
	candidate_id: Uuid,
	ids: &[Uuid],
) -> Result<()> {
	if ids.is_empty() {
		return Ok(());
	}

	let owners: HashMap<Uuid, Uuid> =
		entities::entity_owners(conn, counterpart, ids).await?.into_iter().collect();
	let found: Vec<Uuid> = owners.keys().copied().collect();
	let missing = links::missing_ids(ids, &found);

	if !missing.is_empty() {
		return Err(Error::LinkMismatch {
			message: format!("Some {counterpart} ids do not exist."),
			ids: missing,
		});
	}

	let mut foreign = Vec::new();

	for id in ids {
		if owners.get(id).is_some_and(|owner| *owner != candidate_id) && !foreign.contains(id) {
			foreign.push(*id);
		}
	}

	if !foreign.is_empty() {
		return Err(Error::LinkMismatch {
			message: format!("Some {counterpart} ids belong to another candidate."),
			ids: foreign,
		});
	}

	Ok(())
}

/// Links `entity_id` of `kind` to each counterpart id. Returns how many links were new.
pub(crate) async fn insert_links(
	conn: &mut PgConnection,
	kind: EntityKind,
	entity_id: Uuid,
	counterpart_ids: &[Uuid],
) -> Result<usize> {
	let mut inserted = 0;

	for counterpart_id in counterpart_ids {
		let (promise_id, action_id) = match kind {
			EntityKind::Promise => (entity_id, *counterpart_id),
			EntityKind::Action => (*counterpart_id, entity_id),
		};

		if entities::insert_link(&mut *conn, promise_id, action_id).await? {
			inserted += 1;
		}
	}

	Ok(inserted)
}
