pub mod admin;
pub mod answer;
pub mod fidelity;
pub mod search;
pub mod summarize;
pub mod sync;
pub mod validate;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;

pub use admin::StatusReport;
pub use answer::{AnswerRequest, AnswerResponse};
pub use fidelity::{
	ClaimReport, ClaimStatus, CompletenessReport, ComprehensiveReport, FidelityReport,
	HallucinationReport, JudgeParse,
};
use gazette_config::{
	Config, EmbeddingProviderConfig, GenerationProviderConfig, NewswireProviderConfig,
};
use gazette_providers::{
	embedding,
	generation::{self, GenerationRequest},
	newswire::{self, FetchedArticle},
};
use gazette_storage::{index::SemanticIndex, store::ArticleStore};
pub use search::{RetrievalCandidate, RetrievedContext, SourceInfo};
pub use summarize::{SummarizeRequest, SummarizeResponse, SummaryStyle};
pub use sync::SyncReport;
pub use validate::{Evaluation, TopicEvaluation};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, gazette_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		request: GenerationRequest<'a>,
	) -> BoxFuture<'a, gazette_providers::Result<String>>;
}

pub trait NewswireProvider
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a NewswireProviderConfig,
		query: &'a str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> BoxFuture<'a, gazette_providers::Result<Vec<FetchedArticle>>>;
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, gazette_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		request: GenerationRequest<'a>,
	) -> BoxFuture<'a, gazette_providers::Result<String>> {
		Box::pin(generation::generate(cfg, request))
	}
}

impl NewswireProvider for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a NewswireProviderConfig,
		query: &'a str,
		from: OffsetDateTime,
		to: OffsetDateTime,
	) -> BoxFuture<'a, gazette_providers::Result<Vec<FetchedArticle>>> {
		Box::pin(newswire::fetch(cfg, query, from, to))
	}
}

/// External collaborators, injected so tests can substitute fakes. The
/// generation provider serves both summarization and the judge role; the two
/// uses share no state beyond the HTTP client each call builds.
#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
	pub newswire: Arc<dyn NewswireProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
		newswire: Arc<dyn NewswireProvider>,
	) -> Self {
		Self { embedding, generation, newswire }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider.clone(), newswire: provider }
	}
}

pub struct GazetteService {
	pub cfg: Config,
	pub store: ArticleStore,
	pub index: Arc<dyn SemanticIndex>,
	pub providers: Providers,
}
impl GazetteService {
	pub fn new(cfg: Config, store: ArticleStore, index: Arc<dyn SemanticIndex>) -> Self {
		Self { cfg, store, index, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		store: ArticleStore,
		index: Arc<dyn SemanticIndex>,
		providers: Providers,
	) -> Self {
		Self { cfg, store, index, providers }
	}
}

pub(crate) fn embedding_model_tag(cfg: &Config) -> String {
	format!(
		"{}:{}:{}",
		cfg.providers.embedding.provider_id,
		cfg.providers.embedding.model,
		cfg.storage.qdrant.vector_dim
	)
}
