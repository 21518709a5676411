//! Duplicate suppression: within one run by clustering, then against stored rows.

use sqlx::PgConnection;
use uuid::Uuid;

use ptracker_config::Config;
use ptracker_domain::{EntityKind, clustering};
use ptracker_storage::{entities, vector::vector_to_pg};

use crate::{AnalysisContext, DraftEntity, Result};

pub(crate) async fn deduplicate(
	ctx: &AnalysisContext<'_>,
	kind: EntityKind,
	candidate_id: Uuid,
	drafts: Vec<DraftEntity>,
) -> Result<Vec<DraftEntity>> {
	let before = drafts.len();
	let representatives =
		clustering::representatives(drafts, ctx.cfg.pipeline.duplicate_sim_threshold());

	tracing::debug!(
		kind = %kind,
		candidate_id = %candidate_id,
		before,
		after = representatives.len(),
		"Clustered drafts."
	);

	let mut kept = Vec::with_capacity(representatives.len());

	for draft in representatives {
		let vec = vector_to_pg(&draft.embedding);
		let existing = entities::find_within_distance(
			&ctx.db.pool,
			kind,
			candidate_id,
			&vec,
			ctx.cfg.pipeline.duplicate_dist_threshold,
			None,
			Some(1),
		)
		.await?;

		if let Some(existing_id) = existing.first() {
			tracing::info!(
				kind = %kind,
				candidate_id = %candidate_id,
				existing_id = %existing_id,
				"Dropped draft matching a stored claim."
			);

			continue;
		}

		kept.push(draft);
	}

	Ok(kept)
}

/// Stored claims of `kind` that `embedding` would duplicate, nearest first.
pub(crate) async fn find_conflicts(
	conn: &mut PgConnection,
	cfg: &Config,
	kind: EntityKind,
	candidate_id: Uuid,
	embedding: &[f32],
	exclude_id: Option<Uuid>,
) -> Result<Vec<Uuid>> {
	let vec = vector_to_pg(embedding);
	let ids = entities::find_within_distance(
		conn,
		kind,
		candidate_id,
		&vec,
		cfg.pipeline.duplicate_dist_threshold,
		exclude_id,
		None,
	)
	.await?;

	Ok(ids)
}
