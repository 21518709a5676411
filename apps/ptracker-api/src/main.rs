use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ptracker_api::Args::parse();

	ptracker_api::run(args).await
}
