use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	gazette_worker::run(gazette_worker::Args::parse()).await
}
