use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub freshness: Freshness,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub sync: Sync,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: StorageBackend,
	pub postgres: Option<Postgres>,
	pub sqlite: Option<Sqlite>,
	pub qdrant: Qdrant,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
	Postgres,
	Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Sqlite {
	pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
	pub judge: GenerationProviderConfig,
	pub newswire: NewswireProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct NewswireProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub language: String,
	pub page_size: u32,
	#[serde(default)]
	pub sources: Option<String>,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
}

#[derive(Debug, Deserialize)]
pub struct Freshness {
	#[serde(default = "default_min_articles")]
	pub min_articles: u32,
	#[serde(default = "default_max_article_age_hours")]
	pub max_article_age_hours: f64,
	#[serde(default = "default_fetch_lookback_days")]
	pub fetch_lookback_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Ranking {
	#[serde(default = "default_similarity_weight")]
	pub similarity_weight: f32,
	#[serde(default = "default_freshness_weight")]
	pub freshness_weight: f32,
	#[serde(default = "default_decay_window_hours")]
	pub decay_window_hours: f64,
}

#[derive(Debug, Deserialize)]
pub struct Sync {
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	#[serde(default = "default_metadata_ceiling_bytes")]
	pub metadata_ceiling_bytes: usize,
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
}

impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: default_top_k() }
	}
}

impl Default for Freshness {
	fn default() -> Self {
		Self {
			min_articles: default_min_articles(),
			max_article_age_hours: default_max_article_age_hours(),
			fetch_lookback_days: default_fetch_lookback_days(),
		}
	}
}

impl Default for Ranking {
	fn default() -> Self {
		Self {
			similarity_weight: default_similarity_weight(),
			freshness_weight: default_freshness_weight(),
			decay_window_hours: default_decay_window_hours(),
		}
	}
}

impl Default for Sync {
	fn default() -> Self {
		Self {
			batch_size: default_batch_size(),
			metadata_ceiling_bytes: default_metadata_ceiling_bytes(),
			poll_interval_secs: default_poll_interval_secs(),
		}
	}
}

fn default_top_k() -> u32 {
	5
}

fn default_min_articles() -> u32 {
	5
}

fn default_max_article_age_hours() -> f64 {
	24.0
}

fn default_fetch_lookback_days() -> i64 {
	7
}

fn default_similarity_weight() -> f32 {
	0.7
}

fn default_freshness_weight() -> f32 {
	0.3
}

fn default_decay_window_hours() -> f64 {
	168.0
}

fn default_batch_size() -> u32 {
	100
}

fn default_metadata_ceiling_bytes() -> usize {
	40_960
}

fn default_poll_interval_secs() -> u64 {
	300
}
