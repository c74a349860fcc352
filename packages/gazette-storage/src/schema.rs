use gazette_config::StorageBackend;

/// Renders the articles schema for the selected backend. The layouts differ
/// only in the binary and timestamp column types.
pub fn render_schema(backend: StorageBackend) -> String {
	let (blob_type, timestamp_type) = match backend {
		StorageBackend::Postgres => ("BYTEA", "TIMESTAMPTZ"),
		StorageBackend::Sqlite => ("BLOB", "TEXT"),
	};

	format!(
		"\
CREATE TABLE IF NOT EXISTS articles (
	article_id TEXT PRIMARY KEY,
	title TEXT NOT NULL,
	description TEXT NOT NULL DEFAULT '',
	body TEXT NOT NULL DEFAULT '',
	url TEXT NOT NULL UNIQUE,
	source TEXT NOT NULL DEFAULT '',
	author TEXT NOT NULL DEFAULT '',
	published_at TEXT,
	fetched_at {timestamp_type} NOT NULL,
	embedding {blob_type},
	embedding_model TEXT
);
CREATE INDEX IF NOT EXISTS idx_articles_source ON articles (source);
CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)"
	)
}
