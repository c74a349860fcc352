use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use serde_json::Map;
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};

use gazette_config::{
	Config, EmbeddingProviderConfig, Freshness, GenerationProviderConfig, NewswireProviderConfig,
	Providers as ProvidersConfig, Qdrant, Ranking, Retrieval, Service, Sqlite, Storage,
	StorageBackend, Sync as SyncConfig,
};
use gazette_domain::freshness::FreshnessState;
use gazette_providers::{generation::GenerationRequest, newswire::FetchedArticle};
use gazette_service::{
	AnswerRequest, BoxFuture, EmbeddingProvider, GazetteService, GenerationProvider,
	NewswireProvider, Providers, SummarizeRequest, SummaryStyle,
};
use gazette_storage::{models::NewArticle, store::ArticleStore};
use gazette_testkit::{MemoryIndex, article_fixture, toy_embedding};

const DIM: u32 = 8;

struct HistogramEmbedding;
impl EmbeddingProvider for HistogramEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, gazette_providers::Result<Vec<Vec<f32>>>> {
		let dim = cfg.dimensions as usize;
		let out: Vec<Vec<f32>> = texts.iter().map(|text| toy_embedding(text, dim)).collect();

		Box::pin(async move { Ok(out) })
	}
}

struct ScriptedGeneration {
	response: String,
	calls: Arc<AtomicUsize>,
}
impl ScriptedGeneration {
	fn new(response: &str) -> Self {
		Self { response: response.to_string(), calls: Arc::new(AtomicUsize::new(0)) }
	}
}
impl GenerationProvider for ScriptedGeneration {
	fn generate<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_request: GenerationRequest<'a>,
	) -> BoxFuture<'a, gazette_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let response = self.response.clone();

		Box::pin(async move { Ok(response) })
	}
}

struct StubNewswire {
	articles: Vec<FetchedArticle>,
	calls: Arc<AtomicUsize>,
}
impl StubNewswire {
	fn new(articles: Vec<FetchedArticle>) -> Self {
		Self { articles, calls: Arc::new(AtomicUsize::new(0)) }
	}
}
impl NewswireProvider for StubNewswire {
	fn fetch<'a>(
		&'a self,
		_cfg: &'a NewswireProviderConfig,
		_query: &'a str,
		_from: OffsetDateTime,
		_to: OffsetDateTime,
	) -> BoxFuture<'a, gazette_providers::Result<Vec<FetchedArticle>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let articles = self.articles.clone();

		Box::pin(async move { Ok(articles) })
	}
}

fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			backend: StorageBackend::Sqlite,
			postgres: None,
			sqlite: Some(Sqlite { path: "sqlite::memory:".to_string() }),
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "articles_test".to_string(),
				vector_dim: DIM,
			},
		},
		providers: ProvidersConfig {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/".to_string(),
				model: "toy".to_string(),
				dimensions: DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			generation: generation_config(),
			judge: generation_config(),
			newswire: NewswireProviderConfig {
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				language: "en".to_string(),
				page_size: 20,
				sources: None,
				timeout_ms: 1_000,
			},
		},
		retrieval: Retrieval::default(),
		freshness: Freshness::default(),
		ranking: Ranking::default(),
		sync: SyncConfig::default(),
	}
}

fn generation_config() -> GenerationProviderConfig {
	GenerationProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://localhost".to_string(),
		api_key: "key".to_string(),
		path: "/".to_string(),
		model: "scripted".to_string(),
		temperature: 0.3,
		max_tokens: 500,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

struct Harness {
	service: GazetteService,
	index: Arc<MemoryIndex>,
	generation_calls: Arc<AtomicUsize>,
	newswire_calls: Arc<AtomicUsize>,
}

async fn build_harness(generation_response: &str, wire_articles: Vec<FetchedArticle>) -> Harness {
	let store =
		ArticleStore::connect_sqlite("sqlite::memory:").await.expect("Failed to open sqlite.");

	store.ensure_schema().await.expect("Failed to apply schema.");

	let index = Arc::new(MemoryIndex::new());
	let generation = Arc::new(ScriptedGeneration::new(generation_response));
	let newswire = Arc::new(StubNewswire::new(wire_articles));
	let generation_calls = generation.calls.clone();
	let newswire_calls = newswire.calls.clone();
	let providers = Providers::new(Arc::new(HistogramEmbedding), generation, newswire);
	let service = GazetteService::with_providers(test_config(), store, index.clone(), providers);

	Harness { service, index, generation_calls, newswire_calls }
}

fn rfc3339_hours_ago(hours: i64) -> String {
	(OffsetDateTime::now_utc() - Duration::hours(hours))
		.format(&Rfc3339)
		.expect("Failed to format timestamp.")
}

fn wire_article(url: &str, published_at: &str) -> FetchedArticle {
	FetchedArticle {
		title: format!("Climate update at {url}"),
		description: "Emissions policy shifts across major economies.".to_string(),
		body: "Governments announced new climate commitments alongside energy market reforms."
			.to_string(),
		url: url.to_string(),
		source: "Wire".to_string(),
		author: "Reporter".to_string(),
		published_at: Some(published_at.to_string()),
	}
}

async fn seed_fresh_articles(service: &GazetteService, count: usize) {
	let articles: Vec<NewArticle> = (0..count)
		.map(|n| {
			let mut article = article_fixture(
				&format!("https://example.com/climate-{n}"),
				"Example",
				Some(rfc3339_hours_ago(1).as_str()),
			);

			article.title = format!("Climate development number {n}");
			article.body =
				"Climate policy and emissions reductions moved forward today.".to_string();

			article
		})
		.collect();
	let report = service.store.insert_batch(&articles).await.expect("Seeding failed.");

	assert_eq!(report.inserted.len(), count);

	let sync = service.sync_index().await.expect("Seed sync failed.");

	assert_eq!(sync.synced as usize, count);
}

#[tokio::test]
async fn sync_is_idempotent() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;

	for n in 0..3 {
		service
			.store
			.insert(&article_fixture(
				&format!("https://example.com/{n}"),
				"Example",
				Some("2026-01-08T09:00:00Z"),
			))
			.await
			.unwrap();
	}

	let first = service.sync_index().await.unwrap();

	assert_eq!(first.synced, 3);
	assert_eq!(first.skipped, 0);
	assert_eq!(first.failed, 0);
	assert_eq!(first.total, 3);

	let ids_after_first = harness.index.id_set();
	let second = service.sync_index().await.unwrap();

	assert_eq!(second.synced, 0);
	assert_eq!(second.skipped, 3);
	assert_eq!(harness.index.id_set(), ids_after_first);
}

#[tokio::test]
async fn sync_counts_textless_articles_as_failed() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;
	let mut empty = article_fixture("https://example.com/empty", "Example", None);

	empty.title = String::new();
	empty.description = String::new();
	empty.body = String::new();

	service.store.insert(&empty).await.unwrap();
	service.store.insert(&article_fixture("https://example.com/ok", "Example", None)).await.unwrap();

	let report = service.sync_index().await.unwrap();

	assert_eq!(report.synced, 1);
	assert_eq!(report.failed, 1);
	assert_eq!(report.total, 2);
	assert_eq!(harness.index.id_set().len(), 1);
}

#[tokio::test]
async fn rebuild_reindexes_everything() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;

	service.store.insert(&article_fixture("https://example.com/a", "Example", None)).await.unwrap();
	service.sync_index().await.unwrap();

	let rebuilt = service.rebuild_index().await.unwrap();

	assert_eq!(rebuilt.synced, 1);
	assert_eq!(rebuilt.skipped, 0);
}

#[tokio::test]
async fn answer_fetches_when_the_store_is_empty() {
	let published = rfc3339_hours_ago(2);
	let wire: Vec<FetchedArticle> = (0..8)
		.map(|n| wire_article(&format!("https://wire.example.com/{n}"), &published))
		.collect();
	let harness = build_harness(
		"Climate commitments advanced today. However, energy markets remain volatile.",
		wire,
	)
	.await;
	let response = harness
		.service
		.process_query(AnswerRequest {
			query: "tell me about climate change?".to_string(),
			max_articles: 4,
			summary_words: 150,
			style: SummaryStyle::Concise,
		})
		.await
		.unwrap();

	assert_eq!(response.topic, "climate change");
	assert_eq!(response.freshness.state, FreshnessState::Empty);
	assert_eq!(response.newly_fetched, 8);
	assert!(!response.cached);
	assert!(response.summary.is_some());
	assert!(response.message.is_none());
	assert!(response.articles_used > 0 && response.articles_used <= 4);
	assert!(!response.sources.is_empty());
	assert_eq!(harness.newswire_calls.load(Ordering::SeqCst), 1);
	assert_eq!(harness.index.id_set().len(), 8);
}

#[tokio::test]
async fn answer_serves_a_fresh_cache_without_fetching() {
	let harness = build_harness("Cached summary of recent climate coverage.", Vec::new()).await;

	seed_fresh_articles(&harness.service, 6).await;

	let response = harness
		.service
		.process_query(AnswerRequest {
			query: "what's new with climate policy".to_string(),
			max_articles: 3,
			summary_words: 100,
			style: SummaryStyle::Comprehensive,
		})
		.await
		.unwrap();

	assert_eq!(response.freshness.state, FreshnessState::Fresh);
	assert_eq!(response.newly_fetched, 0);
	assert!(response.cached);
	assert!(response.summary.is_some());
	assert_eq!(harness.newswire_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn answer_returns_a_structured_no_articles_result() {
	let harness = build_harness("unused", Vec::new()).await;
	let response = harness
		.service
		.process_query(AnswerRequest {
			query: "tell me about deep sea mining".to_string(),
			max_articles: 5,
			summary_words: 150,
			style: SummaryStyle::Concise,
		})
		.await
		.unwrap();

	assert!(response.summary.is_none());
	assert!(response.message.as_deref().unwrap_or("").contains("No relevant articles"));
	assert_eq!(response.newly_fetched, 0);
	assert_eq!(harness.generation_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn summarize_returns_empty_response_without_candidates() {
	let harness = build_harness("unused", Vec::new()).await;
	let response = harness
		.service
		.summarize_topic(SummarizeRequest {
			topic: "fusion power".to_string(),
			max_articles: 5,
			summary_words: 100,
			style: SummaryStyle::BulletPoints,
		})
		.await
		.unwrap();

	assert!(response.summary.is_none());
	assert_eq!(response.article_count, 0);
}

#[tokio::test]
async fn ranked_retrieval_orders_by_composite_and_truncates() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;
	let ages = [120_i64, 1, 72, 6, 200, 12, 48, 24];
	let articles: Vec<NewArticle> = ages
		.iter()
		.enumerate()
		.map(|(n, hours)| {
			let mut article = article_fixture(
				&format!("https://example.com/ranked-{n}"),
				"Example",
				Some(rfc3339_hours_ago(*hours).as_str()),
			);

			article.body = "Climate policy and emissions trading updates.".to_string();

			article
		})
		.collect();

	service.store.insert_batch(&articles).await.unwrap();
	service.sync_index().await.unwrap();

	let candidates =
		service.retrieve_for_query("climate policy", 16, None, 0.0).await.unwrap();

	assert_eq!(candidates.len(), 8);

	let now = OffsetDateTime::now_utc();
	let ranked = service.rank_candidates(candidates, 4, now);

	assert_eq!(ranked.len(), 4);

	let composites: Vec<f32> = ranked
		.iter()
		.map(|candidate| {
			let decay = gazette_domain::rank::freshness_decay(
				&service.cfg.ranking,
				candidate.published_at(),
				now,
			);

			gazette_domain::rank::composite(&service.cfg.ranking, candidate.similarity, decay)
		})
		.collect();

	for pair in composites.windows(2) {
		assert!(pair[0] >= pair[1]);
	}
}

#[tokio::test]
async fn judge_fallback_never_raises_on_malformed_output() {
	let harness = build_harness("I am unable to evaluate this summary.", Vec::new()).await;
	let report = harness
		.service
		.check_fidelity("A summary.", &["A source article.".to_string()], false)
		.await
		.unwrap();

	assert_eq!(report.overall_fidelity, 0.5);
	assert_eq!(report.factual_consistency, 0.5);
	assert!(report.parse.is_unparsed());
}

#[tokio::test]
async fn judge_recovers_fenced_json() {
	let harness = build_harness(
		"```json\n{\"overall_fidelity\": 0.9, \"factual_consistency\": 0.95}\n```",
		Vec::new(),
	)
	.await;
	let report = harness
		.service
		.check_fidelity("A summary.", &["A source article.".to_string()], true)
		.await
		.unwrap();

	assert_eq!(report.overall_fidelity, 0.9);
	assert!(!report.parse.is_unparsed());
}

#[tokio::test]
async fn comprehensive_check_excludes_unusable_subchecks() {
	let harness = build_harness("not json at all", Vec::new()).await;
	let report = harness
		.service
		.comprehensive_check("A summary.", &["A source article.".to_string()])
		.await
		.unwrap();

	assert!(report.overall_score.is_none());
	assert!(report.fidelity.parse.is_unparsed());

	let harness = build_harness(
		"{\"overall_fidelity\": 0.85, \"factual_consistency\": 0.9}",
		Vec::new(),
	)
	.await;
	let report = harness
		.service
		.comprehensive_check("A summary.", &["A source article.".to_string()])
		.await
		.unwrap();

	// Only the fidelity check yields a usable headline score here; the
	// claim and completeness responses carry no rates.
	assert_eq!(report.overall_score, Some(0.85));
}

#[tokio::test]
async fn delete_cascades_from_store_to_index() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;
	let article = article_fixture("https://example.com/gone", "Example", None);
	let article_id = article.article_id();

	service.store.insert(&article).await.unwrap();
	service.sync_index().await.unwrap();
	assert!(harness.index.id_set().contains(&article_id));

	let deleted = service.delete_article(&article_id).await.unwrap();

	assert!(deleted);
	assert!(service.store.get(&article_id).await.unwrap().is_none());
	assert!(!harness.index.id_set().contains(&article_id));

	let status = service.status().await.unwrap();

	assert_eq!(status.store_total, 0);
	assert_eq!(status.index_count, 0);
	assert!(status.in_sync);
}

#[tokio::test]
async fn status_reports_divergence() {
	let harness = build_harness("unused", Vec::new()).await;
	let service = &harness.service;

	service.store.insert(&article_fixture("https://example.com/a", "Example", None)).await.unwrap();

	let before = service.status().await.unwrap();

	assert!(!before.in_sync);
	assert_eq!(before.difference, 1);

	service.sync_index().await.unwrap();

	let after = service.status().await.unwrap();

	assert!(after.in_sync);
	assert_eq!(after.store_with_embedding, 1);
}

#[tokio::test]
async fn evaluate_topic_scores_the_generated_summary() {
	let harness = build_harness(
		"Climate policy advanced today. However, emissions trading remains contested. \
		 Governments and markets are adjusting their commitments accordingly.",
		Vec::new(),
	)
	.await;

	seed_fresh_articles(&harness.service, 5).await;

	let evaluated = harness
		.service
		.evaluate_topic("climate policy", 3, 80, SummaryStyle::Concise)
		.await
		.unwrap();

	assert!(evaluated.summary.is_some());

	let evaluation = evaluated.evaluation.expect("Evaluation must be present.");

	assert!(evaluation.report.quality.score >= 50);
	assert!(evaluation.fidelity.is_none());
}
