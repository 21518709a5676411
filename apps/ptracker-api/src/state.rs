use std::sync::Arc;

use ptracker_service::PtrackerService;
use ptracker_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<PtrackerService>,
}
impl AppState {
	pub async fn new(config: ptracker_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(
			config.providers.embedding.promise_dimensions,
			config.providers.embedding.action_dimensions,
		)
		.await?;

		Ok(Self::from_service(PtrackerService::new(config, db)))
	}

	pub fn from_service(service: PtrackerService) -> Self {
		Self { service: Arc::new(service) }
	}
}
