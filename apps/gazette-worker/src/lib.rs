use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod worker;

use gazette_service::GazetteService;
use gazette_storage::{qdrant::QdrantIndex, store::ArticleStore};

#[derive(Debug, Parser)]
#[command(rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = gazette_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let store = ArticleStore::connect(&config.storage).await?;

	store.ensure_schema().await?;

	let index = QdrantIndex::new(&config.storage.qdrant)?;

	index.ensure_collection().await?;

	let service = GazetteService::new(config, store, Arc::new(index));

	worker::run_worker(service).await
}
