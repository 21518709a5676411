use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ptracker_worker::Args::parse();

	ptracker_worker::run(args).await
}
