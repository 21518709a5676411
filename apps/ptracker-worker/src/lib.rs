pub mod worker;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ptracker_service::{PtrackerService, SourceAnalyzer};
use ptracker_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = ptracker_cli::VERSION,
	rename_all = "kebab",
	styles = ptracker_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = ptracker_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(
		config.providers.embedding.promise_dimensions,
		config.providers.embedding.action_dimensions,
	)
	.await?;

	let poll_interval = Duration::from_millis(config.worker.poll_interval_ms);
	let state = worker::WorkerState {
		service: PtrackerService::new(config, db),
		analyzer: SourceAnalyzer::default(),
		poll_interval,
	};

	worker::run_worker(state).await
}
