use std::str::FromStr;

use sqlx::{
	PgPool, SqlitePool,
	postgres::PgPoolOptions,
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
	Result,
	models::{ArticleRecord, BatchInsertReport, InsertOutcome, NewArticle, SourceCount, StoreStats},
	schema,
};
use gazette_config::{Storage as StorageConfig, StorageBackend};

const INSERT_SQL: &str = "\
INSERT INTO articles (
	article_id,
	title,
	description,
	body,
	url,
	source,
	author,
	published_at,
	fetched_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (url) DO NOTHING";

const SELECT_COLUMNS: &str = "\
SELECT
	article_id,
	title,
	description,
	body,
	url,
	source,
	author,
	published_at,
	fetched_at,
	embedding,
	embedding_model
FROM articles";

/// The relational article store. The backend is chosen once, at construction,
/// from config; both variants speak the same SQL surface.
pub enum ArticleStore {
	Postgres(PgPool),
	Sqlite(SqlitePool),
}

macro_rules! on_pool {
	($store:expr, $pool:ident => $body:expr) => {
		match $store {
			ArticleStore::Postgres($pool) => $body,
			ArticleStore::Sqlite($pool) => $body,
		}
	};
}

impl ArticleStore {
	pub async fn connect(cfg: &StorageConfig) -> Result<Self> {
		match cfg.backend {
			StorageBackend::Postgres => {
				let pg = cfg.postgres.as_ref().ok_or_else(|| {
					crate::Error::InvalidArgument(
						"storage.postgres is required for the postgres backend.".to_string(),
					)
				})?;
				let pool = PgPoolOptions::new()
					.max_connections(pg.pool_max_conns)
					.connect(&pg.dsn)
					.await?;

				Ok(Self::Postgres(pool))
			},
			StorageBackend::Sqlite => {
				let lite = cfg.sqlite.as_ref().ok_or_else(|| {
					crate::Error::InvalidArgument(
						"storage.sqlite is required for the sqlite backend.".to_string(),
					)
				})?;

				Self::connect_sqlite(&lite.path).await
			},
		}
	}

	pub async fn connect_sqlite(path: &str) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(path)?.create_if_missing(true);
		// A pooled in-memory database would open one fresh database per
		// connection; pin it to a single connection.
		let max_connections = if path.contains(":memory:") { 1 } else { 5 };
		let pool = SqlitePoolOptions::new()
			.max_connections(max_connections)
			.connect_with(options)
			.await?;

		Ok(Self::Sqlite(pool))
	}

	pub fn backend(&self) -> StorageBackend {
		match self {
			Self::Postgres(_) => StorageBackend::Postgres,
			Self::Sqlite(_) => StorageBackend::Sqlite,
		}
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema(self.backend());

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			on_pool!(self, pool => {
				sqlx::query(trimmed).execute(pool).await?;
			});
		}

		Ok(())
	}

	/// Inserts one article. A duplicate url is a distinct outcome, not an
	/// error.
	pub async fn insert(&self, article: &NewArticle) -> Result<InsertOutcome> {
		if article.url.trim().is_empty() {
			return Err(crate::Error::InvalidArgument(
				"Article url must be non-empty.".to_string(),
			));
		}

		let article_id = article.article_id();
		let rows_affected = on_pool!(self, pool => {
			sqlx::query(INSERT_SQL)
				.bind(article_id.as_str())
				.bind(article.title.as_str())
				.bind(article.description.as_str())
				.bind(article.body.as_str())
				.bind(article.url.as_str())
				.bind(article.source.as_str())
				.bind(article.author.as_str())
				.bind(article.published_at.as_deref())
				.bind(article.fetched_at)
				.execute(pool)
				.await?
				.rows_affected()
		});

		if rows_affected == 0 {
			return Ok(InsertOutcome::Duplicate);
		}

		Ok(InsertOutcome::Inserted(article_id))
	}

	/// Inserts a batch sequentially, returning the ids that were actually
	/// inserted. The id list feeds the narrow sync path, so it must be exact.
	pub async fn insert_batch(&self, articles: &[NewArticle]) -> Result<BatchInsertReport> {
		let mut report = BatchInsertReport::default();

		for article in articles {
			match self.insert(article).await? {
				InsertOutcome::Inserted(id) => report.inserted.push(id),
				InsertOutcome::Duplicate => report.duplicates += 1,
			}
		}

		Ok(report)
	}

	pub async fn get(&self, article_id: &str) -> Result<Option<ArticleRecord>> {
		let sql = format!("{SELECT_COLUMNS} WHERE article_id = $1");

		on_pool!(self, pool => {
			Ok(sqlx::query_as::<_, ArticleRecord>(&sql)
				.bind(article_id)
				.fetch_optional(pool)
				.await?)
		})
	}

	pub async fn get_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
		let sql = format!("{SELECT_COLUMNS} WHERE url = $1");

		on_pool!(self, pool => {
			Ok(sqlx::query_as::<_, ArticleRecord>(&sql).bind(url).fetch_optional(pool).await?)
		})
	}

	pub async fn get_many(&self, article_ids: &[String]) -> Result<Vec<ArticleRecord>> {
		let mut out = Vec::with_capacity(article_ids.len());

		for article_id in article_ids {
			if let Some(record) = self.get(article_id).await? {
				out.push(record);
			}
		}

		Ok(out)
	}

	pub async fn list(&self, limit: Option<u32>) -> Result<Vec<ArticleRecord>> {
		let sql = match limit {
			Some(limit) => {
				format!("{SELECT_COLUMNS} ORDER BY fetched_at DESC LIMIT {limit}")
			},
			None => format!("{SELECT_COLUMNS} ORDER BY fetched_at DESC"),
		};

		on_pool!(self, pool => {
			Ok(sqlx::query_as::<_, ArticleRecord>(&sql).fetch_all(pool).await?)
		})
	}

	pub async fn list_by_source(
		&self,
		source: &str,
		limit: Option<u32>,
	) -> Result<Vec<ArticleRecord>> {
		let sql = match limit {
			Some(limit) => {
				format!(
					"{SELECT_COLUMNS} WHERE source = $1 ORDER BY fetched_at DESC LIMIT {limit}"
				)
			},
			None => format!("{SELECT_COLUMNS} WHERE source = $1 ORDER BY fetched_at DESC"),
		};

		on_pool!(self, pool => {
			Ok(sqlx::query_as::<_, ArticleRecord>(&sql).bind(source).fetch_all(pool).await?)
		})
	}

	pub async fn list_ids(&self) -> Result<Vec<String>> {
		on_pool!(self, pool => {
			Ok(sqlx::query_scalar::<_, String>("SELECT article_id FROM articles")
				.fetch_all(pool)
				.await?)
		})
	}

	pub async fn update_embedding(
		&self,
		article_id: &str,
		vector: &[f32],
		model_tag: &str,
	) -> Result<()> {
		let bytes = crate::models::encode_embedding(vector);
		let rows_affected = on_pool!(self, pool => {
			sqlx::query(
				"UPDATE articles SET embedding = $1, embedding_model = $2 WHERE article_id = $3",
			)
			.bind(bytes.as_slice())
			.bind(model_tag)
			.bind(article_id)
			.execute(pool)
			.await?
			.rows_affected()
		});

		if rows_affected == 0 {
			return Err(crate::Error::NotFound(format!("Article {article_id} does not exist.")));
		}

		Ok(())
	}

	pub async fn delete(&self, article_id: &str) -> Result<bool> {
		let rows_affected = on_pool!(self, pool => {
			sqlx::query("DELETE FROM articles WHERE article_id = $1")
				.bind(article_id)
				.execute(pool)
				.await?
				.rows_affected()
		});

		Ok(rows_affected > 0)
	}

	pub async fn stats(&self) -> Result<StoreStats> {
		let total = on_pool!(self, pool => {
			sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles").fetch_one(pool).await?
		});
		let with_embedding = on_pool!(self, pool => {
			sqlx::query_scalar::<_, i64>(
				"SELECT COUNT(*) FROM articles WHERE embedding IS NOT NULL",
			)
			.fetch_one(pool)
			.await?
		});
		let by_source = on_pool!(self, pool => {
			sqlx::query_as::<_, (String, i64)>(
				"SELECT source, COUNT(*) FROM articles GROUP BY source ORDER BY COUNT(*) DESC",
			)
			.fetch_all(pool)
			.await?
		});

		Ok(StoreStats {
			total,
			with_embedding,
			by_source: by_source
				.into_iter()
				.map(|(source, count)| SourceCount { source, count })
				.collect(),
		})
	}
}
