mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Freshness, GenerationProviderConfig, NewswireProviderConfig,
	Postgres, Providers, Qdrant, Ranking, Retrieval, Service, Sqlite, Storage, StorageBackend, Sync,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	match cfg.storage.backend {
		StorageBackend::Postgres =>
			if cfg.storage.postgres.as_ref().map(|pg| pg.dsn.trim().is_empty()).unwrap_or(true) {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be set for the postgres backend."
						.to_string(),
				});
			},
		StorageBackend::Sqlite =>
			if cfg.storage.sqlite.as_ref().map(|lite| lite.path.trim().is_empty()).unwrap_or(true) {
				return Err(Error::Validation {
					message: "storage.sqlite.path must be set for the sqlite backend.".to_string(),
				});
			},
	}

	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
		("judge", &cfg.providers.judge.api_key),
		("newswire", &cfg.providers.newswire.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.freshness.min_articles == 0 {
		return Err(Error::Validation {
			message: "freshness.min_articles must be greater than zero.".to_string(),
		});
	}
	if !(cfg.freshness.max_article_age_hours.is_finite()
		&& cfg.freshness.max_article_age_hours > 0.0)
	{
		return Err(Error::Validation {
			message: "freshness.max_article_age_hours must be a positive number.".to_string(),
		});
	}
	if cfg.freshness.fetch_lookback_days <= 0 {
		return Err(Error::Validation {
			message: "freshness.fetch_lookback_days must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.similarity_weight", cfg.ranking.similarity_weight),
		("ranking.freshness_weight", cfg.ranking.freshness_weight),
	] {
		if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if (cfg.ranking.similarity_weight + cfg.ranking.freshness_weight - 1.0).abs() > 1e-6 {
		return Err(Error::Validation {
			message: "ranking.similarity_weight and ranking.freshness_weight must sum to 1.0."
				.to_string(),
		});
	}
	if !(cfg.ranking.decay_window_hours.is_finite() && cfg.ranking.decay_window_hours > 0.0) {
		return Err(Error::Validation {
			message: "ranking.decay_window_hours must be a positive number.".to_string(),
		});
	}
	if cfg.sync.batch_size == 0 {
		return Err(Error::Validation {
			message: "sync.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.sync.metadata_ceiling_bytes == 0 {
		return Err(Error::Validation {
			message: "sync.metadata_ceiling_bytes must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
