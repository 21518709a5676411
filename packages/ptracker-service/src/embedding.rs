use ptracker_config::Config;
use ptracker_domain::{EntityKind, similarity};

use crate::{Error, Providers, Result};

pub(crate) fn dimensions_for(cfg: &Config, kind: EntityKind) -> u32 {
	match kind {
		EntityKind::Promise => cfg.providers.embedding.promise_dimensions,
		EntityKind::Action => cfg.providers.embedding.action_dimensions,
	}
}

/// Embeds one claim at `kind`'s configured width and L2-normalizes the result.
pub(crate) async fn embed_for_kind(
	cfg: &Config,
	providers: &Providers,
	kind: EntityKind,
	text: &str,
) -> Result<Vec<f32>> {
	let dimensions = dimensions_for(cfg, kind);
	let texts = vec![text.to_string()];
	let mut vectors =
		providers.embedding.embed(&cfg.providers.embedding, dimensions, &texts).await?;

	if vectors.len() != 1 {
		return Err(Error::Provider {
			message: "Embedding provider must return exactly one vector per text.".to_string(),
		});
	}

	let mut vec = vectors.swap_remove(0);

	if vec.len() != dimensions as usize {
		return Err(Error::Provider {
			message: format!(
				"Embedding has {} dimensions, expected {dimensions} for {kind}.",
				vec.len()
			),
		});
	}

	similarity::l2_normalize(&mut vec);

	Ok(vec)
}
